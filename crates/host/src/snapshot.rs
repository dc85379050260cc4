//! Newest snapshot per profile.
//!
//! Snapshots can arrive out of order when the extension runs overlapping
//! syncs. The store keeps, for each `accountId`, the payload with the
//! greatest timestamp; on a tie the later arrival wins.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use linkmate_protocol::SyncPayload;

#[derive(Debug, Default)]
pub struct SnapshotStore {
	latest: BTreeMap<String, SyncPayload>,
}

impl SnapshotStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `payload` unless a newer one for the same profile is held.
	/// Returns whether it was stored.
	pub fn apply(&mut self, payload: SyncPayload) -> bool {
		if let Some(current) = self.latest.get(&payload.account_id) {
			if current.timestamp > payload.timestamp {
				return false;
			}
		}
		self.latest.insert(payload.account_id.clone(), payload);
		true
	}

	pub fn get(&self, account_id: &str) -> Option<&SyncPayload> {
		self.latest.get(account_id)
	}

	/// Writes all held snapshots as one JSON object keyed by account id.
	///
	/// Writes to a sibling temp file first so readers never see a partial file.
	pub async fn write_to(&self, path: &Path) -> Result<()> {
		let json = serde_json::to_vec_pretty(&self.latest)?;
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(parent)
				.await
				.with_context(|| format!("Failed to create {}", parent.display()))?;
		}

		let tmp = path.with_extension("json.tmp");
		tokio::fs::write(&tmp, json)
			.await
			.with_context(|| format!("Failed to write {}", tmp.display()))?;
		tokio::fs::rename(&tmp, path)
			.await
			.with_context(|| format!("Failed to replace {}", path.display()))?;
		Ok(())
	}
}

//! Message loop of the native host.

use std::path::PathBuf;

use anyhow::Result;
use linkmate_protocol::{HostMessage, SyncPayload, frame};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::frame_io::{read_frame, write_frame};
use crate::snapshot::SnapshotStore;

pub struct Host {
	snapshots: SnapshotStore,
	snapshot_out: Option<PathBuf>,
	received: u64,
}

impl Host {
	pub fn new(snapshot_out: Option<PathBuf>) -> Self {
		Self {
			snapshots: SnapshotStore::new(),
			snapshot_out,
			received: 0,
		}
	}

	pub fn snapshots(&self) -> &SnapshotStore {
		&self.snapshots
	}

	/// Messages handled so far, including rejected ones.
	pub fn received(&self) -> u64 {
		self.received
	}

	/// Reads frames until the browser closes the pipe, replying to each.
	///
	/// Undecodable messages are answered with [`HostMessage::Rejected`] and
	/// the loop continues; broken framing ends it with an error.
	pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
	where
		R: AsyncRead + Unpin,
		W: AsyncWrite + Unpin,
	{
		while let Some(body) = read_frame(&mut reader).await? {
			let reply = self.handle(&body).await;
			write_frame(&mut writer, &reply).await?;
		}
		info!(target = "linkmate", received = self.received, "browser closed the port");
		Ok(())
	}

	/// Handles one frame body and returns the reply for it.
	pub async fn handle(&mut self, body: &[u8]) -> HostMessage {
		self.received += 1;

		let payload: SyncPayload = match frame::decode(body) {
			Ok(payload) => payload,
			Err(err) => {
				warn!(target = "linkmate", error = %err, "rejected message");
				return HostMessage::Rejected {
					reason: err.to_string(),
				};
			}
		};

		let timestamp = payload.timestamp;
		let tabs = payload.tabs().len();
		let groups = payload.groups().len();
		let account_id = payload.account_id.clone();
		let browser = payload.browser;

		let applied = self.snapshots.apply(payload);
		if applied {
			info!(target = "linkmate", %browser, %account_id, timestamp, tabs, groups, "snapshot received");
			self.persist().await;
		} else {
			debug!(target = "linkmate", %account_id, timestamp, "discarded stale snapshot");
		}

		HostMessage::SyncAck {
			timestamp,
			tabs,
			groups,
			applied,
		}
	}

	async fn persist(&self) {
		let Some(path) = &self.snapshot_out else {
			return;
		};
		if let Err(err) = self.snapshots.write_to(path).await {
			warn!(target = "linkmate", path = %path.display(), error = %format!("{err:#}"), "failed to write snapshot file");
		}
	}
}

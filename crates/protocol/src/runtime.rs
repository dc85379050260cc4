//! Messages between extension pages (popup, options) and the background worker.
//!
//! Requests are tagged by `action`, responses by `status`:
//!
//! ```text
//! -> {"action": "TRIGGER_SYNC"}
//! <- {"status": "success", "data": { ...TABS_SYNC payload... }}
//! ```

use serde::{Deserialize, Serialize};

use crate::sync::SyncPayload;

/// Request sent by an extension page to the background worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeRequest {
	/// Take a full snapshot now and return it.
	TriggerSync,
	/// Store a new display name for this profile, then sync.
	RenameProfile { name: String },
}

/// Response returned to the requesting page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RuntimeResponse {
	Success { data: SyncPayload },
	Error { message: String },
}

impl RuntimeResponse {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}
}

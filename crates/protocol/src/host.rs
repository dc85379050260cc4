//! Replies from the native host back to the extension.

use serde::{Deserialize, Serialize};

/// Message posted by the native host on the native messaging port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
	/// A `TABS_SYNC` payload was received and decoded.
	SyncAck {
		/// Timestamp of the acknowledged payload.
		timestamp: i64,
		tabs: usize,
		groups: usize,
		/// Whether the payload replaced the host's current snapshot. Older
		/// payloads arriving late are acknowledged but not applied.
		applied: bool,
	},
	/// The host could not decode a message.
	Rejected { reason: String },
}

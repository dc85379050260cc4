//! Error types for the sync engine.

use thiserror::Error;

use crate::platform::PlatformError;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort or degrade a sync attempt.
///
/// Account lookup failures never appear here: the identity resolver logs
/// them and falls through to the next identity source.
#[derive(Debug, Error)]
pub enum Error {
	/// Reading or writing extension storage failed.
	#[error("storage access failed for '{key}': {source}")]
	Storage {
		key: &'static str,
		#[source]
		source: PlatformError,
	},

	/// The tabs query failed.
	#[error("tab query failed: {0}")]
	TabQuery(#[source] PlatformError),

	/// The tab groups query failed on a platform that supports groups.
	#[error("tab group query failed: {0}")]
	GroupQuery(#[source] PlatformError),

	/// The native channel could not be opened.
	#[error("failed to connect to native host '{host}': {source}")]
	ChannelOpen {
		host: String,
		#[source]
		source: PlatformError,
	},

	/// The native channel refused the message.
	#[error("failed to post to native host: {0}")]
	ChannelPost(#[source] PlatformError),

	/// The payload could not be turned into JSON.
	#[error("failed to encode payload: {0}")]
	Encode(#[from] serde_json::Error),

	/// A rename was requested with a blank name.
	#[error("profile name must not be empty")]
	EmptyProfileName,
}

impl Error {
	/// Whether the failure happened while delivering to the native host.
	pub fn is_transport(&self) -> bool {
		matches!(self, Error::ChannelOpen { .. } | Error::ChannelPost(_))
	}
}

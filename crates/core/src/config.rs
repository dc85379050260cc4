//! Engine configuration.

use linkmate_protocol::{BrowserKind, NATIVE_HOST_ID};
use serde::{Deserialize, Serialize};

/// Settings for one sync engine instance.
///
/// Fields missing from a serialized config take the defaults of its
/// `browser`, so `{"browser": "firefox"}` has account lookup off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PartialSyncConfig")]
pub struct SyncConfig {
	/// Browser family reported in every payload.
	pub browser: BrowserKind,
	/// Native messaging host that receives payloads.
	pub native_host: String,
	/// Try the signed-in account email before the local profile id.
	pub account_lookup: bool,
}

impl SyncConfig {
	/// Defaults for `browser`. Firefox has no account lookup API.
	pub fn for_browser(browser: BrowserKind) -> Self {
		Self {
			browser,
			native_host: NATIVE_HOST_ID.to_string(),
			account_lookup: !matches!(browser, BrowserKind::Firefox),
		}
	}

	pub fn with_native_host(mut self, host: impl Into<String>) -> Self {
		self.native_host = host.into();
		self
	}
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self::for_browser(BrowserKind::Chrome)
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialSyncConfig {
	#[serde(default)]
	browser: Option<BrowserKind>,
	#[serde(default)]
	native_host: Option<String>,
	#[serde(default)]
	account_lookup: Option<bool>,
}

impl From<PartialSyncConfig> for SyncConfig {
	fn from(partial: PartialSyncConfig) -> Self {
		let mut config = Self::for_browser(partial.browser.unwrap_or(BrowserKind::Chrome));
		if let Some(host) = partial.native_host {
			config = config.with_native_host(host);
		}
		if let Some(account_lookup) = partial.account_lookup {
			config.account_lookup = account_lookup;
		}
		config
	}
}

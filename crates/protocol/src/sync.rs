//! Snapshot message sent from the extension to the native host.
//!
//! ```text
//! {
//!   "type": "TABS_SYNC",
//!   "browser": "chrome",
//!   "accountId": "Profile-4821",
//!   "profileName": "Work",
//!   "timestamp": 1700000000000,
//!   "data": { "tabs": [...], "groups": [...] }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Browser family the snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
	Chrome,
	Firefox,
	Edge,
}

impl BrowserKind {
	/// Detects the browser family from what the worker can observe.
	///
	/// Firefox exposes the `browser` namespace; Edge is Chromium with an
	/// `Edg/` token in its user agent. Everything else is treated as Chrome.
	pub fn detect(has_browser_namespace: bool, user_agent: &str) -> Self {
		if has_browser_namespace {
			Self::Firefox
		} else if user_agent.contains("Edg") {
			Self::Edge
		} else {
			Self::Chrome
		}
	}

	/// Lowercase label used on the wire and as the default profile name.
	pub fn label(self) -> &'static str {
		match self {
			Self::Chrome => "chrome",
			Self::Firefox => "firefox",
			Self::Edge => "edge",
		}
	}
}

impl fmt::Display for BrowserKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Constant `type` tag of a snapshot message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadType {
	#[default]
	#[serde(rename = "TABS_SYNC")]
	TabsSync,
}

/// Complete snapshot of the browser's tabs and groups at one instant.
///
/// Immutable once built; every sync produces a new one. Consumers treat the
/// payload with the greatest [`timestamp`](Self::timestamp) as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
	#[serde(rename = "type")]
	pub kind: PayloadType,
	pub browser: BrowserKind,
	/// Stable per-install profile identifier.
	pub account_id: String,
	/// User-editable display label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub profile_name: Option<String>,
	/// Capture time in epoch milliseconds.
	pub timestamp: i64,
	pub data: SyncData,
}

impl SyncPayload {
	pub fn tabs(&self) -> &[TabRecord] {
		&self.data.tabs
	}

	pub fn groups(&self) -> &[GroupRecord] {
		&self.data.groups
	}
}

/// Tabs and groups in the order the browser returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncData {
	pub tabs: Vec<TabRecord>,
	#[serde(default)]
	pub groups: Vec<GroupRecord>,
}

/// One open tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
	pub tab_id: i64,
	pub title: String,
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fav_icon_url: Option<String>,
	/// Owning tab group. Chromium reports `-1` for ungrouped tabs and the
	/// value is passed through as-is.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group_id: Option<i64>,
}

/// One tab group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
	pub group_id: i64,
	pub title: String,
	pub color: GroupColor,
}

/// Tab group colours as named by the tab groups API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
	#[default]
	Grey,
	Blue,
	Red,
	Yellow,
	Green,
	Pink,
	Purple,
	Cyan,
	Orange,
}

impl GroupColor {
	/// Parses a platform colour label, returning [`None`] for labels this
	/// protocol does not know.
	pub fn from_label(label: &str) -> Option<Self> {
		Some(match label {
			"grey" => Self::Grey,
			"blue" => Self::Blue,
			"red" => Self::Red,
			"yellow" => Self::Yellow,
			"green" => Self::Green,
			"pink" => Self::Pink,
			"purple" => Self::Purple,
			"cyan" => Self::Cyan,
			"orange" => Self::Orange,
			_ => return None,
		})
	}
}

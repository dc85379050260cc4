//! Browser capabilities the engine depends on.
//!
//! A [`Platform`] wraps extension storage, the tabs and tab groups APIs, the
//! optional signed-in account lookup, and native messaging. The wasm worker
//! implements it over the extension APIs; tests implement it in memory.

use std::rc::Rc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Opaque failure reported by a platform capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
	message: String,
}

impl PlatformError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Tab as reported by the tabs API.
///
/// Only the fields the engine reads are declared; anything else the browser
/// reports is dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserTab {
	pub id: Option<i64>,
	pub title: Option<String>,
	pub url: Option<String>,
	pub fav_icon_url: Option<String>,
	pub group_id: Option<i64>,
}

/// Tab group as reported by the tab groups API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserGroup {
	pub id: i64,
	pub title: Option<String>,
	pub color: String,
}

/// Open native messaging port.
pub trait NativePort {
	/// Posts one JSON message to the host.
	fn post_message(&self, message: &Value) -> Result<(), PlatformError>;

	/// Closes the port. Closing an already closed port is a no-op.
	fn disconnect(&self) {}
}

/// Receives the asynchronous signals of a [`NativePort`].
pub trait PortListener {
	/// Message posted by the native host.
	fn on_message(&self, message: Value);

	/// The port closed. `error` carries the browser's reason, if any.
	fn on_disconnect(&self, error: Option<String>);
}

/// Everything the sync engine needs from the browser.
#[async_trait(?Send)]
pub trait Platform {
	/// Email of the signed-in browser account.
	///
	/// Returns `Ok(None)` when the browser has no such API, no account is
	/// signed in, or access was not granted.
	async fn account_email(&self) -> Result<Option<String>, PlatformError> {
		Ok(None)
	}

	/// Reads a string from extension-local storage.
	async fn get_storage_value(&self, key: &str) -> Result<Option<String>, PlatformError>;

	/// Writes a string to extension-local storage.
	async fn set_storage_value(&self, key: &str, value: &str) -> Result<(), PlatformError>;

	/// All open tabs, in browser order.
	async fn query_tabs(&self) -> Result<Vec<BrowserTab>, PlatformError>;

	/// Whether the browser has a tab groups API.
	fn supports_tab_groups(&self) -> bool;

	/// All tab groups, in browser order. Only called when
	/// [`supports_tab_groups`](Self::supports_tab_groups) is true.
	async fn query_groups(&self) -> Result<Vec<BrowserGroup>, PlatformError>;

	/// Connects to the native host registered under `host`.
	fn open_channel(
		&self,
		host: &str,
		listener: Rc<dyn PortListener>,
	) -> Result<Box<dyn NativePort>, PlatformError>;

	/// Current time in epoch milliseconds.
	fn now_millis(&self) -> i64;
}

//! Profile identity resolution.
//!
//! The account id is resolved once per process, from the first source that
//! yields one:
//!
//! 1. The signed-in account email (Chromium only, when access is granted)
//! 2. A local profile id previously written to extension storage
//! 3. A freshly generated id, written to storage before it is returned
//!
//! Once written, the local id is never regenerated. The display name lives
//! under its own storage key, can be edited at any time, and is re-read on
//! every resolution.

use std::cell::RefCell;
use std::rc::Rc;

use linkmate_protocol::BrowserKind;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::platform::Platform;

/// Storage key for the generated id on Chromium browsers.
pub const PROFILE_ID_KEY: &str = "localProfileId";

/// Storage key for the generated id on Firefox.
pub const PROFILE_UUID_KEY: &str = "localProfileUuid";

/// Storage key for the user-editable display name.
pub const PROFILE_NAME_KEY: &str = "localProfileName";

/// Resolved identity of the profile being synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
	pub account_id: String,
	pub profile_name: Option<String>,
}

/// Shape of generated local ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
	/// `Profile-` followed by four digits, stored under [`PROFILE_ID_KEY`].
	ProfileNumber,
	/// `id-` followed by nine lowercase alphanumerics, stored under [`PROFILE_UUID_KEY`].
	Alphanumeric,
}

impl IdScheme {
	pub fn for_browser(browser: BrowserKind) -> Self {
		match browser {
			BrowserKind::Firefox => Self::Alphanumeric,
			BrowserKind::Chrome | BrowserKind::Edge => Self::ProfileNumber,
		}
	}

	pub fn storage_key(self) -> &'static str {
		match self {
			Self::ProfileNumber => PROFILE_ID_KEY,
			Self::Alphanumeric => PROFILE_UUID_KEY,
		}
	}

	pub fn generate(self) -> String {
		let mut rng = rand::thread_rng();
		match self {
			Self::ProfileNumber => format!("Profile-{}", rng.gen_range(1000..10000)),
			Self::Alphanumeric => {
				let suffix: String = (&mut rng)
					.sample_iter(Alphanumeric)
					.take(9)
					.map(|b| char::from(b).to_ascii_lowercase())
					.collect();
				format!("id-{suffix}")
			}
		}
	}
}

/// Resolves and caches the profile identity for this process.
pub struct IdentityResolver {
	platform: Rc<dyn Platform>,
	browser: BrowserKind,
	account_lookup: bool,
	scheme: IdScheme,
	// Filled on first successful resolution, kept for the life of the process.
	account_id: RefCell<Option<String>>,
}

impl IdentityResolver {
	pub fn new(platform: Rc<dyn Platform>, config: &SyncConfig) -> Self {
		Self {
			platform,
			browser: config.browser,
			account_lookup: config.account_lookup,
			scheme: IdScheme::for_browser(config.browser),
			account_id: RefCell::new(None),
		}
	}

	/// Returns the current identity.
	///
	/// Only storage failures are returned as errors; a failing account
	/// lookup falls through to the local id.
	pub async fn resolve(&self) -> Result<Identity> {
		let cached = self.account_id.borrow().clone();
		let account_id = match cached {
			Some(id) => id,
			None => {
				let id = self.resolve_account_id().await?;
				*self.account_id.borrow_mut() = Some(id.clone());
				id
			}
		};

		let profile_name = self.profile_name().await?;
		Ok(Identity {
			account_id,
			profile_name: Some(profile_name),
		})
	}

	/// Stores a new display name. Surrounding whitespace is trimmed.
	pub async fn rename_profile(&self, name: &str) -> Result<()> {
		let name = name.trim();
		if name.is_empty() {
			return Err(Error::EmptyProfileName);
		}

		self.platform
			.set_storage_value(PROFILE_NAME_KEY, name)
			.await
			.map_err(|source| Error::Storage {
				key: PROFILE_NAME_KEY,
				source,
			})?;
		info!(target = "linkmate", profile_name = name, "profile renamed");
		Ok(())
	}

	async fn resolve_account_id(&self) -> Result<String> {
		if self.account_lookup {
			match self.platform.account_email().await {
				Ok(Some(email)) if !email.is_empty() => {
					debug!(target = "linkmate", "using signed-in account email");
					return Ok(email);
				}
				Ok(_) => debug!(target = "linkmate", "no signed-in account available"),
				Err(err) => {
					warn!(target = "linkmate", error = %err, "could not fetch profile info");
				}
			}
		}

		let key = self.scheme.storage_key();
		let stored = self
			.platform
			.get_storage_value(key)
			.await
			.map_err(|source| Error::Storage { key, source })?;
		if let Some(id) = stored.filter(|id| !id.is_empty()) {
			return Ok(id);
		}

		let id = self.scheme.generate();
		self.platform
			.set_storage_value(key, &id)
			.await
			.map_err(|source| Error::Storage { key, source })?;
		info!(target = "linkmate", account_id = %id, "generated local profile id");
		Ok(id)
	}

	async fn profile_name(&self) -> Result<String> {
		let stored = self
			.platform
			.get_storage_value(PROFILE_NAME_KEY)
			.await
			.map_err(|source| Error::Storage {
				key: PROFILE_NAME_KEY,
				source,
			})?;
		Ok(stored
			.filter(|name| !name.is_empty())
			.unwrap_or_else(|| self.browser.label().to_string()))
	}
}

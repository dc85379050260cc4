//! Lifecycle event handling and the sync pipeline.
//!
//! Every qualifying event triggers a full resync of the current state; no
//! diffs are computed. Overlapping syncs are not serialized: each one builds
//! and sends its own timestamped snapshot and the consumer keeps the newest.

use std::cell::Cell;
use std::rc::Rc;

use linkmate_protocol::{RuntimeRequest, RuntimeResponse, SyncPayload};
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

use crate::aggregator::StateAggregator;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::identity::IdentityResolver;
use crate::platform::Platform;
use crate::transport::TransportSession;

/// Loading status carried by a tab update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
	Loading,
	Complete,
	Unloaded,
}

impl TabStatus {
	pub fn from_label(label: &str) -> Option<Self> {
		match label {
			"loading" => Some(Self::Loading),
			"complete" => Some(Self::Complete),
			"unloaded" => Some(Self::Unloaded),
			_ => None,
		}
	}
}

/// Browser lifecycle signal delivered to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
	/// Extension installed or updated.
	Installed,
	/// Browser profile started with the extension already installed.
	Startup,
	TabCreated { tab_id: i64 },
	/// Any tab update; `status` is set only when the loading status changed.
	TabUpdated { tab_id: i64, status: Option<TabStatus> },
	TabRemoved { tab_id: i64 },
	TabActivated { tab_id: i64 },
	GroupUpdated { group_id: i64 },
}

impl LifecycleEvent {
	pub fn kind(&self) -> EventKind {
		match self {
			Self::Installed => EventKind::Installed,
			Self::Startup => EventKind::Startup,
			Self::TabCreated { .. } => EventKind::TabCreated,
			Self::TabUpdated { .. } => EventKind::TabUpdated,
			Self::TabRemoved { .. } => EventKind::TabRemoved,
			Self::TabActivated { .. } => EventKind::TabActivated,
			Self::GroupUpdated { .. } => EventKind::GroupUpdated,
		}
	}

	/// The sync this event calls for, if any.
	///
	/// Tab updates only count once the tab has finished loading, so partial
	/// page state is never sent.
	pub fn sync_trigger(&self) -> Option<SyncTrigger> {
		Some(match self {
			Self::Installed => SyncTrigger::Installed,
			Self::Startup => SyncTrigger::Startup,
			Self::TabCreated { .. } => SyncTrigger::TabCreated,
			Self::TabUpdated {
				status: Some(TabStatus::Complete),
				..
			} => SyncTrigger::TabLoaded,
			Self::TabUpdated { .. } => return None,
			Self::TabRemoved { .. } => SyncTrigger::TabRemoved,
			Self::TabActivated { .. } => SyncTrigger::TabActivated,
			Self::GroupUpdated { .. } => SyncTrigger::GroupUpdated,
		})
	}
}

/// Browser event a host environment subscribes to on the dispatcher's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Installed,
	Startup,
	TabCreated,
	TabUpdated,
	TabRemoved,
	TabActivated,
	GroupUpdated,
}

impl EventKind {
	pub const ALL: [EventKind; 7] = [
		EventKind::Installed,
		EventKind::Startup,
		EventKind::TabCreated,
		EventKind::TabUpdated,
		EventKind::TabRemoved,
		EventKind::TabActivated,
		EventKind::GroupUpdated,
	];

	pub fn requires_tab_groups(self) -> bool {
		matches!(self, EventKind::GroupUpdated)
	}
}

/// Why a sync ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
	Installed,
	Startup,
	TabCreated,
	TabLoaded,
	TabRemoved,
	TabActivated,
	GroupUpdated,
	Manual,
	Renamed,
}

/// Outcome of one completed sync.
///
/// The snapshot was built; `delivery` records whether the native host
/// accepted it.
#[derive(Debug)]
pub struct SyncReport {
	pub trigger: SyncTrigger,
	pub payload: SyncPayload,
	pub delivery: Result<()>,
}

impl SyncReport {
	pub fn is_delivered(&self) -> bool {
		self.delivery.is_ok()
	}
}

/// Drives identity → snapshot → transport for every triggering event.
pub struct Dispatcher {
	platform: Rc<dyn Platform>,
	resolver: IdentityResolver,
	aggregator: StateAggregator,
	session: TransportSession,
	attempts: Cell<u64>,
}

impl Dispatcher {
	pub fn new(platform: Rc<dyn Platform>, config: SyncConfig) -> Self {
		Self {
			resolver: IdentityResolver::new(platform.clone(), &config),
			aggregator: StateAggregator::new(platform.clone(), config.browser),
			session: TransportSession::new(platform.clone(), config.native_host),
			platform,
			attempts: Cell::new(0),
		}
	}

	/// Events the host environment should forward to [`dispatch`](Self::dispatch).
	///
	/// Group events are left out when the browser has no tab groups API.
	pub fn subscriptions(&self) -> Vec<EventKind> {
		let groups = self.platform.supports_tab_groups();
		EventKind::ALL
			.into_iter()
			.filter(|kind| groups || !kind.requires_tab_groups())
			.collect()
	}

	/// Handles one lifecycle event.
	///
	/// Returns [`None`] when the event does not call for a sync.
	pub async fn dispatch(&self, event: LifecycleEvent) -> Option<Result<SyncReport>> {
		let Some(trigger) = event.sync_trigger() else {
			trace!(target = "linkmate", ?event, "event does not trigger a sync");
			return None;
		};
		debug!(target = "linkmate", ?event, "sync triggered");
		Some(self.sync(trigger).await)
	}

	/// Handles a request from an extension page.
	pub async fn handle_request(&self, request: RuntimeRequest) -> RuntimeResponse {
		let result = match request {
			RuntimeRequest::TriggerSync => self.sync(SyncTrigger::Manual).await,
			RuntimeRequest::RenameProfile { name } => match self.resolver.rename_profile(&name).await {
				Ok(()) => self.sync(SyncTrigger::Renamed).await,
				Err(err) => Err(err),
			},
		};

		match result {
			Ok(report) => RuntimeResponse::Success { data: report.payload },
			Err(err) => RuntimeResponse::Error {
				message: err.to_string(),
			},
		}
	}

	/// Runs the full pipeline once.
	///
	/// Identity and snapshot failures abort the sync and are returned.
	/// Transport failures do not: the payload is still returned, with the
	/// failure recorded in [`SyncReport::delivery`].
	pub async fn sync(&self, trigger: SyncTrigger) -> Result<SyncReport> {
		self.attempts.set(self.attempts.get() + 1);

		let identity = self.resolver.resolve().await.inspect_err(|err| {
			warn!(target = "linkmate", ?trigger, error = %err, "identity resolution failed");
		})?;
		let payload = self.aggregator.build_snapshot(&identity).await.inspect_err(|err| {
			warn!(target = "linkmate", ?trigger, error = %err, "error fetching tabs");
		})?;

		if tracing::enabled!(tracing::Level::DEBUG) {
			if let Ok(json) = serde_json::to_string_pretty(&payload) {
				debug!(target = "linkmate", "sync data: {json}");
			}
		}

		let delivery = self.session.send(&payload);
		match &delivery {
			Ok(()) => info!(
				target = "linkmate",
				?trigger,
				tabs = payload.tabs().len(),
				groups = payload.groups().len(),
				"snapshot sent"
			),
			Err(err) => warn!(target = "linkmate", ?trigger, error = %err, "snapshot not delivered"),
		}

		Ok(SyncReport {
			trigger,
			payload,
			delivery,
		})
	}

	/// Sync attempts started so far, successful or not.
	pub fn sync_attempts(&self) -> u64 {
		self.attempts.get()
	}

	pub fn session(&self) -> &TransportSession {
		&self.session
	}

	/// Closes the native port, if one is open. The next sync reconnects.
	pub fn shutdown(&self) {
		info!(target = "linkmate", "closing native port");
		self.session.disconnect();
	}
}

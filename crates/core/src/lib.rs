//! LinkMate tab-state synchronization engine.
//!
//! Watches browser lifecycle events, builds a full snapshot of open tabs and
//! tab groups for the current profile, and delivers it to a native companion
//! process over the browser's native messaging channel.
//!
//! The pipeline for one sync:
//!
//! 1. [`Dispatcher`] maps a [`LifecycleEvent`] (or a manual request) to a sync
//! 2. [`IdentityResolver`] resolves the stable account id and display name
//! 3. [`StateAggregator`] reads tabs and groups into a [`SyncPayload`]
//! 4. [`TransportSession`] posts the payload to the native host
//!
//! Everything talks to the browser through the [`Platform`] trait, so the
//! engine runs unchanged inside a wasm background worker or against a fake
//! in tests. All futures are `!Send`; the engine assumes a single-threaded
//! event loop.

pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod platform;
pub mod transport;

pub use aggregator::StateAggregator;
pub use config::SyncConfig;
pub use dispatcher::{Dispatcher, EventKind, LifecycleEvent, SyncReport, SyncTrigger, TabStatus};
pub use error::{Error, Result};
pub use identity::{Identity, IdentityResolver};
pub use linkmate_protocol::{BrowserKind, GroupRecord, SyncPayload, TabRecord};
pub use platform::{BrowserGroup, BrowserTab, NativePort, Platform, PlatformError, PortListener};
pub use transport::{SessionState, TransportSession};

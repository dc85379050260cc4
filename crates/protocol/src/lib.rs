//! Wire types for the LinkMate tab synchronization protocol.
//!
//! The extension background worker and the native host exchange JSON
//! messages over the browser's native messaging channel. This crate holds
//! the shapes of those messages and the length-prefixed framing used on the
//! host side of the pipe.
//!
//! # Main Types
//!
//! - [`SyncPayload`] - Full snapshot of open tabs and groups (`TABS_SYNC`)
//! - [`RuntimeRequest`] / [`RuntimeResponse`] - Messages between extension UI and worker
//! - [`HostMessage`] - Replies from the native host
//! - [`frame`] - Native messaging frame codec

pub mod frame;
mod host;
mod runtime;
mod sync;

pub use frame::FrameError;
pub use host::HostMessage;
pub use runtime::{RuntimeRequest, RuntimeResponse};
pub use sync::{BrowserKind, GroupColor, GroupRecord, PayloadType, SyncData, SyncPayload, TabRecord};

/// Identifier of the native messaging host that receives snapshots.
pub const NATIVE_HOST_ID: &str = "com.linkmate.host";

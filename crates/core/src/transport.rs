//! Native messaging session.
//!
//! State machine:
//!
//! ```text
//! Disconnected --open + post ok--> Connected --port closed--> Disconnected
//!      |                              |
//!      +--open or post fails--> Faulted <--post fails--+
//! ```
//!
//! A connected session is reused for the next payload. `Disconnected` and
//! `Faulted` sessions open a fresh port on the next send; there is no retry
//! timer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use linkmate_protocol::{HostMessage, SyncPayload};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::platform::{NativePort, Platform, PlatformError, PortListener};

/// Connection state of a [`TransportSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Disconnected,
	Connected,
	Faulted,
}

struct SessionInner {
	state: SessionState,
	port: Option<Rc<dyn NativePort>>,
	// Bumped for every opened port so late signals from replaced ports are ignored.
	generation: u64,
	last_error: Option<String>,
}

/// Delivers payloads to the native host.
pub struct TransportSession {
	platform: Rc<dyn Platform>,
	host: String,
	inner: Rc<RefCell<SessionInner>>,
}

impl TransportSession {
	pub fn new(platform: Rc<dyn Platform>, host: impl Into<String>) -> Self {
		Self {
			platform,
			host: host.into(),
			inner: Rc::new(RefCell::new(SessionInner {
				state: SessionState::Disconnected,
				port: None,
				generation: 0,
				last_error: None,
			})),
		}
	}

	pub fn state(&self) -> SessionState {
		self.inner.borrow().state
	}

	/// Last open, post, or disconnect error seen by this session.
	pub fn last_error(&self) -> Option<String> {
		self.inner.borrow().last_error.clone()
	}

	/// Number of ports opened so far.
	pub fn connections_opened(&self) -> u64 {
		self.inner.borrow().generation
	}

	/// Posts `payload`, opening a port first unless one is connected.
	///
	/// Delivery is best effort: success means the browser accepted the
	/// message, not that the host processed it.
	pub fn send(&self, payload: &SyncPayload) -> Result<()> {
		let message = serde_json::to_value(payload)?;

		let reusable = {
			let inner = self.inner.borrow();
			match inner.state {
				SessionState::Connected => inner.port.clone(),
				_ => None,
			}
		};
		if let Some(port) = reusable {
			return self.post(&port, &message);
		}

		let generation = {
			let mut inner = self.inner.borrow_mut();
			inner.generation += 1;
			inner.port = None;
			inner.generation
		};

		let listener = Rc::new(SessionListener {
			inner: Rc::downgrade(&self.inner),
			generation,
		});
		let port: Rc<dyn NativePort> = match self.platform.open_channel(&self.host, listener) {
			Ok(port) => Rc::from(port),
			Err(source) => {
				error!(target = "linkmate", host = %self.host, error = %source, "failed to connect to native host");
				self.fault(&source);
				return Err(Error::ChannelOpen {
					host: self.host.clone(),
					source,
				});
			}
		};

		{
			let mut inner = self.inner.borrow_mut();
			inner.state = SessionState::Connected;
			inner.port = Some(port.clone());
			inner.last_error = None;
		}
		debug!(target = "linkmate", host = %self.host, generation, "native port opened");

		self.post(&port, &message)
	}

	/// Closes the current port, if any.
	pub fn disconnect(&self) {
		let port = {
			let mut inner = self.inner.borrow_mut();
			inner.state = SessionState::Disconnected;
			inner.port.take()
		};
		if let Some(port) = port {
			port.disconnect();
		}
	}

	fn post(&self, port: &Rc<dyn NativePort>, message: &Value) -> Result<()> {
		match port.post_message(message) {
			Ok(()) => Ok(()),
			Err(source) => {
				error!(target = "linkmate", host = %self.host, error = %source, "failed to post to native host");
				self.fault(&source);
				port.disconnect();
				Err(Error::ChannelPost(source))
			}
		}
	}

	fn fault(&self, source: &PlatformError) {
		let mut inner = self.inner.borrow_mut();
		inner.state = SessionState::Faulted;
		inner.port = None;
		inner.last_error = Some(source.to_string());
	}
}

struct SessionListener {
	inner: Weak<RefCell<SessionInner>>,
	generation: u64,
}

impl PortListener for SessionListener {
	fn on_message(&self, message: Value) {
		match serde_json::from_value::<HostMessage>(message.clone()) {
			Ok(HostMessage::SyncAck {
				timestamp,
				tabs,
				groups,
				applied,
			}) => {
				debug!(target = "linkmate", timestamp, tabs, groups, applied, "native host acknowledged sync");
			}
			Ok(HostMessage::Rejected { reason }) => {
				warn!(target = "linkmate", %reason, "native host rejected message");
			}
			Err(_) => info!(target = "linkmate", %message, "received from native host"),
		}
	}

	fn on_disconnect(&self, error: Option<String>) {
		let Some(inner) = self.inner.upgrade() else {
			return;
		};
		let mut inner = inner.borrow_mut();
		if inner.generation != self.generation || inner.state != SessionState::Connected {
			debug!(target = "linkmate", generation = self.generation, "ignoring disconnect from stale port");
			return;
		}

		inner.state = SessionState::Disconnected;
		inner.port = None;
		match error {
			Some(reason) => {
				warn!(target = "linkmate", %reason, "native host disconnected");
				inner.last_error = Some(reason);
			}
			None => info!(target = "linkmate", "native host disconnected"),
		}
	}
}

//! In-memory platform for engine tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use linkmate::{BrowserGroup, BrowserTab, NativePort, Platform, PlatformError, PortListener};
use serde_json::Value;

/// Scripted outcome of the account email lookup.
#[derive(Debug, Clone)]
pub enum AccountLookup {
	Unavailable,
	Email(String),
	Fails,
}

pub struct FakePlatform {
	pub storage: RefCell<HashMap<String, String>>,
	pub account: RefCell<AccountLookup>,
	pub tabs: RefCell<Vec<BrowserTab>>,
	/// `None` means the browser has no tab groups API.
	pub groups: RefCell<Option<Vec<BrowserGroup>>>,
	pub fail_storage_read: Cell<bool>,
	pub fail_storage_write: Cell<bool>,
	pub fail_tab_query: Cell<bool>,
	pub fail_group_query: Cell<bool>,
	pub reject_open: Cell<bool>,
	pub reject_post: Rc<Cell<bool>>,
	pub storage_writes: Cell<usize>,
	pub tab_queries: Cell<usize>,
	pub opened_hosts: RefCell<Vec<String>>,
	pub listeners: RefCell<Vec<Rc<dyn PortListener>>>,
	pub sent: Rc<RefCell<Vec<Value>>>,
	pub closed_ports: Rc<Cell<usize>>,
	pub released_ports: Rc<Cell<usize>>,
	pub clock: Cell<i64>,
}

impl FakePlatform {
	pub fn new() -> Self {
		Self {
			storage: RefCell::new(HashMap::new()),
			account: RefCell::new(AccountLookup::Unavailable),
			tabs: RefCell::new(Vec::new()),
			groups: RefCell::new(Some(Vec::new())),
			fail_storage_read: Cell::new(false),
			fail_storage_write: Cell::new(false),
			fail_tab_query: Cell::new(false),
			fail_group_query: Cell::new(false),
			reject_open: Cell::new(false),
			reject_post: Rc::new(Cell::new(false)),
			storage_writes: Cell::new(0),
			tab_queries: Cell::new(0),
			opened_hosts: RefCell::new(Vec::new()),
			listeners: RefCell::new(Vec::new()),
			sent: Rc::new(RefCell::new(Vec::new())),
			closed_ports: Rc::new(Cell::new(0)),
			released_ports: Rc::new(Cell::new(0)),
			clock: Cell::new(1_700_000_000_000),
		}
	}

	pub fn without_groups() -> Self {
		let platform = Self::new();
		*platform.groups.borrow_mut() = None;
		platform
	}

	pub fn with_tabs(tabs: Vec<BrowserTab>) -> Self {
		let platform = Self::new();
		*platform.tabs.borrow_mut() = tabs;
		platform
	}

	pub fn stored(&self, key: &str) -> Option<String> {
		self.storage.borrow().get(key).cloned()
	}

	pub fn sent_count(&self) -> usize {
		self.sent.borrow().len()
	}

	/// Fires the disconnect signal of the most recently opened port.
	pub fn disconnect_latest(&self, error: Option<&str>) {
		let listener = self.listeners.borrow().last().cloned();
		if let Some(listener) = listener {
			listener.on_disconnect(error.map(str::to_string));
		}
	}

	/// Fires the disconnect signal of the `index`th opened port.
	pub fn disconnect_port(&self, index: usize, error: Option<&str>) {
		let listener = self.listeners.borrow().get(index).cloned();
		if let Some(listener) = listener {
			listener.on_disconnect(error.map(str::to_string));
		}
	}
}

pub fn tab(id: i64, title: &str, url: &str) -> BrowserTab {
	BrowserTab {
		id: Some(id),
		title: Some(title.to_string()),
		url: Some(url.to_string()),
		..Default::default()
	}
}

pub fn group(id: i64, title: &str, color: &str) -> BrowserGroup {
	BrowserGroup {
		id,
		title: Some(title.to_string()),
		color: color.to_string(),
		..Default::default()
	}
}

struct FakePort {
	sent: Rc<RefCell<Vec<Value>>>,
	reject_post: Rc<Cell<bool>>,
	closed: Rc<Cell<usize>>,
	released: Rc<Cell<usize>>,
}

impl Drop for FakePort {
	fn drop(&mut self) {
		self.released.set(self.released.get() + 1);
	}
}

impl NativePort for FakePort {
	fn post_message(&self, message: &Value) -> Result<(), PlatformError> {
		if self.reject_post.get() {
			return Err(PlatformError::new("Attempting to use a disconnected port object"));
		}
		self.sent.borrow_mut().push(message.clone());
		Ok(())
	}

	fn disconnect(&self) {
		self.closed.set(self.closed.get() + 1);
	}
}

#[async_trait(?Send)]
impl Platform for FakePlatform {
	async fn account_email(&self) -> Result<Option<String>, PlatformError> {
		match &*self.account.borrow() {
			AccountLookup::Unavailable => Ok(None),
			AccountLookup::Email(email) => Ok(Some(email.clone())),
			AccountLookup::Fails => Err(PlatformError::new("identity permission missing")),
		}
	}

	async fn get_storage_value(&self, key: &str) -> Result<Option<String>, PlatformError> {
		if self.fail_storage_read.get() {
			return Err(PlatformError::new("storage unavailable"));
		}
		Ok(self.stored(key))
	}

	async fn set_storage_value(&self, key: &str, value: &str) -> Result<(), PlatformError> {
		if self.fail_storage_write.get() {
			return Err(PlatformError::new("quota exceeded"));
		}
		self.storage_writes.set(self.storage_writes.get() + 1);
		self.storage.borrow_mut().insert(key.to_string(), value.to_string());
		Ok(())
	}

	async fn query_tabs(&self) -> Result<Vec<BrowserTab>, PlatformError> {
		self.tab_queries.set(self.tab_queries.get() + 1);
		if self.fail_tab_query.get() {
			return Err(PlatformError::new("tabs unavailable"));
		}
		Ok(self.tabs.borrow().clone())
	}

	fn supports_tab_groups(&self) -> bool {
		self.groups.borrow().is_some()
	}

	async fn query_groups(&self) -> Result<Vec<BrowserGroup>, PlatformError> {
		if self.fail_group_query.get() {
			return Err(PlatformError::new("groups unavailable"));
		}
		Ok(self.groups.borrow().clone().unwrap_or_default())
	}

	fn open_channel(
		&self,
		host: &str,
		listener: Rc<dyn PortListener>,
	) -> Result<Box<dyn NativePort>, PlatformError> {
		self.opened_hosts.borrow_mut().push(host.to_string());
		if self.reject_open.get() {
			return Err(PlatformError::new("Specified native messaging host not found."));
		}
		self.listeners.borrow_mut().push(listener);
		Ok(Box::new(FakePort {
			sent: self.sent.clone(),
			reject_post: self.reject_post.clone(),
			closed: self.closed_ports.clone(),
			released: self.released_ports.clone(),
		}))
	}

	fn now_millis(&self) -> i64 {
		let now = self.clock.get();
		self.clock.set(now + 1);
		now
	}
}

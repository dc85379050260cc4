//! Snapshot construction.

use std::rc::Rc;

use linkmate_protocol::{
	BrowserKind, GroupColor, GroupRecord, PayloadType, SyncData, SyncPayload, TabRecord,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::platform::{BrowserGroup, BrowserTab, Platform};

/// Tab id the tabs API uses for tabs outside a tab strip.
pub const TAB_ID_NONE: i64 = -1;

/// Reads live tabs and groups into a [`SyncPayload`].
///
/// Read-only with respect to the browser. A failing query aborts this
/// snapshot only; the caller decides whether to try again on the next event.
pub struct StateAggregator {
	platform: Rc<dyn Platform>,
	browser: BrowserKind,
}

impl StateAggregator {
	pub fn new(platform: Rc<dyn Platform>, browser: BrowserKind) -> Self {
		Self { platform, browser }
	}

	pub async fn build_snapshot(&self, identity: &Identity) -> Result<SyncPayload> {
		let tabs = self.platform.query_tabs().await.map_err(Error::TabQuery)?;

		let groups = if self.platform.supports_tab_groups() {
			self.platform.query_groups().await.map_err(Error::GroupQuery)?
		} else {
			debug!(target = "linkmate", "tab groups unsupported, sending none");
			Vec::new()
		};

		Ok(SyncPayload {
			kind: PayloadType::TabsSync,
			browser: self.browser,
			account_id: identity.account_id.clone(),
			profile_name: identity.profile_name.clone(),
			timestamp: self.platform.now_millis(),
			data: SyncData {
				tabs: tabs.into_iter().map(tab_record).collect(),
				groups: groups.into_iter().map(group_record).collect(),
			},
		})
	}
}

/// Projects a browser tab onto the wire record.
pub fn tab_record(tab: BrowserTab) -> TabRecord {
	TabRecord {
		tab_id: tab.id.unwrap_or(TAB_ID_NONE),
		title: tab.title.unwrap_or_default(),
		url: tab.url.unwrap_or_default(),
		fav_icon_url: tab.fav_icon_url,
		group_id: tab.group_id,
	}
}

/// Projects a browser tab group onto the wire record.
pub fn group_record(group: BrowserGroup) -> GroupRecord {
	let color = GroupColor::from_label(&group.color).unwrap_or_else(|| {
		debug!(target = "linkmate", color = %group.color, "unknown group colour");
		GroupColor::default()
	});

	GroupRecord {
		group_id: group.id,
		title: group.title.unwrap_or_default(),
		color,
	}
}

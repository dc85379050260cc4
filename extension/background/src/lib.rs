//! LinkMate background worker.
//!
//! Binds the sync engine to the WebExtension APIs: every tab or tab group
//! change sends a full snapshot to the `com.linkmate.host` native host, and
//! extension pages can ask for one with `{action: "TRIGGER_SYNC"}`.

mod events;
mod logging;
mod platform;

use std::rc::Rc;

use linkmate::{Dispatcher, Platform, SyncConfig};
use tracing::{error, info};
use wasm_bindgen::prelude::*;

use crate::platform::{stringify_js_error, ExtensionPlatform};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init_logging();

    if let Err(err) = init() {
        error!(target = "linkmate", error = %stringify_js_error(&err), "init failed");
    }
}

// Listeners are registered before the first await so events that woke the
// worker are delivered to them.
fn init() -> Result<(), JsValue> {
    let platform = ExtensionPlatform::detect()?;
    let api = platform.api().clone();
    let config = SyncConfig::for_browser(platform.browser());
    info!(
        target = "linkmate",
        browser = %config.browser,
        host = %config.native_host,
        tab_groups = platform.supports_tab_groups(),
        "background worker started"
    );

    let platform: Rc<dyn Platform> = Rc::new(platform);
    let dispatcher = Rc::new(Dispatcher::new(platform, config));

    events::subscribe(&api, &dispatcher)?;
    events::serve_requests(&api, &dispatcher)?;
    events::close_on_suspend(&api, &dispatcher)?;
    Ok(())
}

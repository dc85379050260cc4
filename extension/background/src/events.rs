//! Wires browser events and runtime messages to the dispatcher.

use std::rc::Rc;

use js_sys::Function;
use linkmate::aggregator::TAB_ID_NONE;
use linkmate::{Dispatcher, EventKind, LifecycleEvent, TabStatus};
use linkmate_protocol::RuntimeRequest;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::platform::{add_listener, lookup, stringify_js_error, to_js};

/// Registers one listener per subscribed event kind.
///
/// Must run synchronously during worker start so install and startup
/// events are not missed.
pub fn subscribe(api: &JsValue, dispatcher: &Rc<Dispatcher>) -> Result<(), JsValue> {
    for kind in dispatcher.subscriptions() {
        let dispatcher = dispatcher.clone();
        let on_event = Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(
            move |first: JsValue, second: JsValue, _third: JsValue| {
                let event = lifecycle_event(kind, &first, &second);
                let dispatcher = dispatcher.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    // Failures are logged by the dispatcher; nothing to do here
                    let _ = dispatcher.dispatch(event).await;
                });
            },
        );
        add_listener(api, event_path(kind), on_event)?;
        debug!(target = "linkmate", ?kind, "subscribed");
    }
    Ok(())
}

/// Answers `TRIGGER_SYNC` and `RENAME_PROFILE` from extension pages.
///
/// Other messages are left for other listeners.
pub fn serve_requests(api: &JsValue, dispatcher: &Rc<Dispatcher>) -> Result<(), JsValue> {
    let dispatcher = dispatcher.clone();
    let on_message = Closure::<dyn FnMut(JsValue, JsValue, JsValue) -> JsValue>::new(
        move |message: JsValue, _sender: JsValue, send_response: JsValue| {
            let Ok(request) = serde_wasm_bindgen::from_value::<RuntimeRequest>(message) else {
                return JsValue::UNDEFINED;
            };

            let dispatcher = dispatcher.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let response = dispatcher.handle_request(request).await;
                let sent = to_js(&response).and_then(|response| {
                    send_response
                        .unchecked_ref::<Function>()
                        .call1(&JsValue::NULL, &response)
                });
                if let Err(err) = sent {
                    warn!(target = "linkmate", error = %stringify_js_error(&err), "failed to answer request");
                }
            });

            // Keeps the message channel open until sendResponse is called
            JsValue::TRUE
        },
    );
    add_listener(api, &["runtime", "onMessage"], on_message)
}

/// Closes the native port when the browser suspends the worker.
///
/// Browsers without `runtime.onSuspend` simply drop the port with the worker.
pub fn close_on_suspend(api: &JsValue, dispatcher: &Rc<Dispatcher>) -> Result<(), JsValue> {
    if lookup(api, &["runtime", "onSuspend"]).is_none() {
        debug!(target = "linkmate", "runtime.onSuspend unavailable");
        return Ok(());
    }

    let dispatcher = dispatcher.clone();
    let on_suspend = Closure::<dyn FnMut()>::new(move || dispatcher.shutdown());
    add_listener(api, &["runtime", "onSuspend"], on_suspend)
}

fn event_path(kind: EventKind) -> &'static [&'static str] {
    match kind {
        EventKind::Installed => &["runtime", "onInstalled"],
        EventKind::Startup => &["runtime", "onStartup"],
        EventKind::TabCreated => &["tabs", "onCreated"],
        EventKind::TabUpdated => &["tabs", "onUpdated"],
        EventKind::TabRemoved => &["tabs", "onRemoved"],
        EventKind::TabActivated => &["tabs", "onActivated"],
        EventKind::GroupUpdated => &["tabGroups", "onUpdated"],
    }
}

/// Builds the event from listener arguments.
///
/// `onCreated(tab)`, `onUpdated(tabId, changeInfo, tab)`,
/// `onRemoved(tabId, removeInfo)`, `onActivated(activeInfo)`,
/// `tabGroups.onUpdated(group)`. Ids are informational only, so a missing
/// one never suppresses the sync.
fn lifecycle_event(kind: EventKind, first: &JsValue, second: &JsValue) -> LifecycleEvent {
    let id = |value: Option<JsValue>| {
        value
            .and_then(|v| v.as_f64())
            .map_or(TAB_ID_NONE, |v| v as i64)
    };

    match kind {
        EventKind::Installed => LifecycleEvent::Installed,
        EventKind::Startup => LifecycleEvent::Startup,
        EventKind::TabCreated => LifecycleEvent::TabCreated {
            tab_id: id(lookup(first, &["id"])),
        },
        EventKind::TabUpdated => LifecycleEvent::TabUpdated {
            tab_id: id(Some(first.clone())),
            status: lookup(second, &["status"])
                .and_then(|status| status.as_string())
                .and_then(|status| TabStatus::from_label(&status)),
        },
        EventKind::TabRemoved => LifecycleEvent::TabRemoved {
            tab_id: id(Some(first.clone())),
        },
        EventKind::TabActivated => LifecycleEvent::TabActivated {
            tab_id: id(lookup(first, &["tabId"])),
        },
        EventKind::GroupUpdated => LifecycleEvent::GroupUpdated {
            group_id: id(lookup(first, &["id"])),
        },
    }
}

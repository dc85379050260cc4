//! [`Platform`] over the WebExtension APIs.
//!
//! Uses the `browser` namespace when it exists (Firefox) and `chrome`
//! otherwise. Optional APIs (`identity`, `tabGroups`) are probed at runtime
//! rather than bound statically, since not every browser ships them.

use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use linkmate::{BrowserGroup, BrowserKind, BrowserTab, NativePort, Platform, PlatformError, PortListener};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub struct ExtensionPlatform {
    api: JsValue,
    browser: BrowserKind,
    tab_groups: bool,
}

impl ExtensionPlatform {
    pub fn detect() -> Result<Self, JsValue> {
        let global: JsValue = js_sys::global().into();
        let browser_ns = lookup(&global, &["browser"]);
        let api = browser_ns
            .clone()
            .or_else(|| lookup(&global, &["chrome"]))
            .ok_or("no extension API namespace")?;

        let user_agent = lookup(&global, &["navigator", "userAgent"])
            .and_then(|ua| ua.as_string())
            .unwrap_or_default();
        let browser = BrowserKind::detect(browser_ns.is_some(), &user_agent);
        let tab_groups = lookup(&api, &["tabGroups", "query"]).is_some();

        Ok(Self {
            api,
            browser,
            tab_groups,
        })
    }

    pub fn api(&self) -> &JsValue {
        &self.api
    }

    pub fn browser(&self) -> BrowserKind {
        self.browser
    }

    fn namespace(&self, path: &[&str]) -> Result<JsValue, PlatformError> {
        lookup(&self.api, path).ok_or_else(|| PlatformError::new(format!("{} unavailable", path.join("."))))
    }
}

#[async_trait(?Send)]
impl Platform for ExtensionPlatform {
    async fn account_email(&self) -> Result<Option<String>, PlatformError> {
        let Some(identity) = lookup(&self.api, &["identity"]) else {
            return Ok(None);
        };
        if lookup(&identity, &["getProfileUserInfo"]).is_none() {
            return Ok(None);
        }

        let info = call_async(&identity, "getProfileUserInfo", &[])
            .await
            .map_err(platform_error)?;
        Ok(lookup(&info, &["email"])
            .and_then(|email| email.as_string())
            .filter(|email| !email.is_empty()))
    }

    async fn get_storage_value(&self, key: &str) -> Result<Option<String>, PlatformError> {
        let storage = self.namespace(&["storage", "local"])?;
        let keys: JsValue = Array::of1(&JsValue::from_str(key)).into();
        let items = call_async(&storage, "get", &[&keys]).await.map_err(platform_error)?;
        Ok(lookup(&items, &[key]).and_then(|value| value.as_string()))
    }

    async fn set_storage_value(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        let storage = self.namespace(&["storage", "local"])?;
        let items: JsValue = Object::new().into();
        Reflect::set(&items, &JsValue::from_str(key), &JsValue::from_str(value)).map_err(platform_error)?;
        call_async(&storage, "set", &[&items]).await.map_err(platform_error)?;
        Ok(())
    }

    async fn query_tabs(&self) -> Result<Vec<BrowserTab>, PlatformError> {
        let tabs = self.namespace(&["tabs"])?;
        let query: JsValue = Object::new().into();
        let result = call_async(&tabs, "query", &[&query]).await.map_err(platform_error)?;
        serde_wasm_bindgen::from_value(result).map_err(|err| PlatformError::new(err.to_string()))
    }

    fn supports_tab_groups(&self) -> bool {
        self.tab_groups
    }

    async fn query_groups(&self) -> Result<Vec<BrowserGroup>, PlatformError> {
        let groups = self.namespace(&["tabGroups"])?;
        let query: JsValue = Object::new().into();
        let result = call_async(&groups, "query", &[&query]).await.map_err(platform_error)?;
        serde_wasm_bindgen::from_value(result).map_err(|err| PlatformError::new(err.to_string()))
    }

    fn open_channel(
        &self,
        host: &str,
        listener: Rc<dyn PortListener>,
    ) -> Result<Box<dyn NativePort>, PlatformError> {
        let runtime = self.namespace(&["runtime"])?;
        let port = call(&runtime, "connectNative", &[&JsValue::from_str(host)]).map_err(platform_error)?;

        let message_listener = listener.clone();
        let on_message = Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
            let message = serde_wasm_bindgen::from_value::<Value>(message).unwrap_or(Value::Null);
            message_listener.on_message(message);
        });
        let on_disconnect = Closure::<dyn FnMut(JsValue)>::new(move |port: JsValue| {
            // Firefox reports the reason on the port, Chromium on runtime.lastError
            let error = lookup(&port, &["error", "message"])
                .or_else(|| lookup(&runtime, &["lastError", "message"]))
                .and_then(|message| message.as_string());
            listener.on_disconnect(error);
        });

        let mut channel = ExtensionPort {
            port,
            listeners: Vec::new(),
        };
        let registered = channel
            .listen("onMessage", on_message)
            .and_then(|()| channel.listen("onDisconnect", on_disconnect));
        if let Err(err) = registered {
            channel.disconnect();
            return Err(platform_error(err));
        }
        Ok(Box::new(channel))
    }

    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

type PortCallback = Closure<dyn FnMut(JsValue)>;

/// Native port plus the callbacks registered on it. The callbacks live as
/// long as the port, so reconnecting does not accumulate them.
struct ExtensionPort {
    port: JsValue,
    listeners: Vec<(JsValue, PortCallback)>,
}

impl ExtensionPort {
    fn listen(&mut self, event: &str, callback: PortCallback) -> Result<(), JsValue> {
        let target = lookup(&self.port, &[event]).ok_or_else(|| JsValue::from_str(&format!("no event port.{event}")))?;
        call(&target, "addListener", &[callback.as_ref()])?;
        self.listeners.push((target, callback));
        Ok(())
    }
}

impl NativePort for ExtensionPort {
    fn post_message(&self, message: &Value) -> Result<(), PlatformError> {
        let message = to_js(message).map_err(platform_error)?;
        call(&self.port, "postMessage", &[&message]).map_err(platform_error)?;
        Ok(())
    }

    fn disconnect(&self) {
        let _ = call(&self.port, "disconnect", &[]);
    }
}

impl Drop for ExtensionPort {
    fn drop(&mut self) {
        let listeners = std::mem::take(&mut self.listeners);
        for (target, callback) in &listeners {
            let _ = call(target, "removeListener", &[callback.as_ref()]);
        }
        // The session drops its port from inside onDisconnect, so the
        // callback being run must outlive this call.
        wasm_bindgen_futures::spawn_local(async move { drop(listeners) });
    }
}

/// Walks `path` from `root`, returning [`None`] at the first missing step.
pub fn lookup(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    let mut current = root.clone();
    for key in path {
        if current.is_undefined() || current.is_null() {
            return None;
        }
        current = Reflect::get(&current, &JsValue::from_str(key)).ok()?;
    }
    (!current.is_undefined() && !current.is_null()).then_some(current)
}

pub fn call(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let func: Function = Reflect::get(target, &JsValue::from_str(method))?.dyn_into()?;
    let args: Array = args.iter().collect();
    func.apply(target, &args)
}

async fn call_async(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let result = call(target, method, args)?;
    JsFuture::from(Promise::resolve(&result)).await
}

/// Registers `closure` on the event object at `path` and leaks it, so the
/// browser can keep calling it for the life of the worker.
pub fn add_listener<T>(target: &JsValue, path: &[&str], closure: Closure<T>) -> Result<(), JsValue>
where
    T: ?Sized + WasmClosure,
{
    let event = lookup(target, path).ok_or_else(|| JsValue::from_str(&format!("no event {}", path.join("."))))?;
    call(&event, "addListener", &[closure.as_ref()])?;
    closure.forget();
    Ok(())
}

/// Converts to a plain JS object (not `Map`) so the browser can clone it.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

pub fn stringify_js_error(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| lookup(err, &["message"]).and_then(|message| message.as_string()))
        .or_else(|| js_sys::JSON::stringify(err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

fn platform_error(err: JsValue) -> PlatformError {
    PlatformError::new(stringify_js_error(&err))
}

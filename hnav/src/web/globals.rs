use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};

/// Read a page-provided global such as `window.HEADER_SETTINGS`.
pub(crate) fn read_global<T: DeserializeOwned>(name: &str) -> Option<T> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(name)).ok()?;

    if value.is_undefined() || value.is_null() {
        return None;
    }

    let json = js_sys::JSON::stringify(&value).ok()?.as_string()?;

    match serde_json::from_str(&json) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("window.{name} ignored: {e}");
            None
        }
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_error(value: JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }

    value
        .as_string()
        .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()))
        .unwrap_or_else(|| "unknown JavaScript error".to_owned())
}

use hnav_lang::{KeyValueStore, StorageError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Storage, Window};

use super::globals::js_error;

/// `localStorage` or `sessionStorage`. Missing storage (blocked cookies,
/// sandboxed frames) surfaces as `StorageError::Unavailable` on every call.
#[derive(Debug, Clone)]
pub(crate) struct WebStorage {
    storage: Option<Storage>,
}

impl WebStorage {
    pub(crate) fn local(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }

    pub(crate) fn session(window: &Window) -> Self {
        Self {
            storage: window.session_storage().ok().flatten(),
        }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

fn write_error(key: &str, value: JsValue) -> StorageError {
    let quota = value
        .dyn_ref::<js_sys::Error>()
        .is_some_and(|error| String::from(error.name()) == "QuotaExceededError");

    if quota {
        StorageError::QuotaExceeded {
            key: key.to_owned(),
        }
    } else {
        StorageError::Backend(js_error(value))
    }
}

impl KeyValueStore for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(js_error(e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| write_error(key, e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend(js_error(e)))
    }
}

use hnav_utils::{HistoryApi, HistoryError, HistoryMethod};
use wasm_bindgen::JsValue;
use web_sys::Window;

use super::globals::js_error;

/// `window.location` and `window.history`.
#[derive(Debug, Clone)]
pub(crate) struct BrowserHistory {
    window: Window,
}

impl BrowserHistory {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }

    fn write_state(&self, method: HistoryMethod, url: &str) -> Result<(), HistoryError> {
        let history = self.window.history().map_err(|_| HistoryError::Unavailable)?;

        let result = match method {
            HistoryMethod::Push => history.push_state_with_url(&JsValue::NULL, "", Some(url)),
            HistoryMethod::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(url)),
        };

        result.map_err(|e| HistoryError::Rejected {
            method,
            url: url.to_owned(),
            reason: js_error(e),
        })
    }
}

impl HistoryApi for BrowserHistory {
    fn pathname(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_owned())
    }

    fn search(&self) -> String {
        self.window.location().search().unwrap_or_default()
    }

    fn length(&self) -> usize {
        self.window
            .history()
            .and_then(|history| history.length())
            .map(|length| length as usize)
            .unwrap_or_default()
    }

    fn push_state(&self, url: &str) -> Result<(), HistoryError> {
        self.write_state(HistoryMethod::Push, url)
    }

    fn replace_state(&self, url: &str) -> Result<(), HistoryError> {
        self.write_state(HistoryMethod::Replace, url)
    }

    fn redirect(&self, url: &str) -> Result<(), HistoryError> {
        self.window
            .location()
            .replace(url)
            .map_err(|e| HistoryError::Redirect {
                url: url.to_owned(),
                reason: js_error(e),
            })
    }
}

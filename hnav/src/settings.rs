use std::time::Duration;

use hnav_lang::{EnforcerOptions, StorageKeys};
use hnav_router::RouterOptions;
use hnav_utils::Lang;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Page-provided settings, read from `window.HEADER_SETTINGS`.
/// Every field has a default, so `{}` is a valid document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderSettings {
    pub default_language: Lang,
    pub supported_languages: Vec<Lang>,
    pub storage_keys: StorageKeys,
    pub buttons_url: String,
    pub fetch_timeout_ms: u64,
    pub redirect_marker_ttl_ms: u64,
    pub notification_ms: u64,
    pub error_message: String,
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            default_language: Lang::En,
            supported_languages: Lang::ALL.to_vec(),
            storage_keys: StorageKeys::default(),
            buttons_url: "/data/buttons.json".to_owned(),
            fetch_timeout_ms: 5_000,
            redirect_marker_ttl_ms: 3_000,
            notification_ms: 4_000,
            error_message: RouterOptions::default().error_message,
        }
    }
}

impl HeaderSettings {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Settings(e.to_string()))
    }

    pub fn supports(&self, lang: Lang) -> bool {
        self.supported_languages.contains(&lang)
    }

    /// Map a `navigator.language` tag onto a supported language.
    pub fn browser_language(&self, tag: Option<&str>) -> Option<Lang> {
        tag.and_then(Lang::from_browser_tag)
            .filter(|lang| self.supports(*lang))
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            error_message: self.error_message.clone(),
        }
    }

    pub fn enforcer_options(&self, browser_lang: Option<Lang>) -> EnforcerOptions {
        EnforcerOptions {
            default_lang: self.default_language,
            browser_lang,
            redirect_marker_key: self.storage_keys.redirect_marker.clone(),
            redirect_marker_ttl_ms: self.redirect_marker_ttl_ms,
        }
    }
}

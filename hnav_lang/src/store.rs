use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },
    #[error("stored value under `{key}` is malformed: {reason}")]
    Malformed { key: String, reason: String },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// String key/value persistence, shaped like the Web Storage API.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Names of the persisted entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub selected_language: String,
    pub last_change: String,
    pub navigation_map: String,
    pub redirect_marker: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            selected_language: "selectedLanguage".to_owned(),
            last_change: "lastLanguageChange".to_owned(),
            navigation_map: "navigationLanguageMap".to_owned(),
            redirect_marker: "langRedirectPending".to_owned(),
        }
    }
}

impl StorageKeys {
    /// Whether a cross-tab write to `key` can change the authoritative language.
    pub fn is_language_key(&self, key: &str) -> bool {
        key == self.selected_language || key == self.last_change
    }
}

/// In-memory store. `MemoryStore::unavailable()` fails every call, like
/// storage in a locked-down private window.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    unavailable: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let store = Self::default();
        store.unavailable.set(true);
        store
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.get() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use hnav_utils::{EventBus, HeaderEvent, Lang};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::store::{KeyValueStore, StorageError, StorageKeys};

/// A language decision and when it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRecord {
    pub lang: Lang,
    pub timestamp: u64,
    pub source: String,
}

/// Persisted language selection.
///
/// This is the only writer of the selected-language and last-change entries
/// and the only publisher of `language-changed`. When storage stops working
/// the store keeps serving the last written values from memory for the rest
/// of the tab's lifetime.
pub struct LanguageStore {
    storage: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    bus: EventBus<HeaderEvent>,
    keys: StorageKeys,
    degraded: Cell<bool>,
    mirror: RefCell<Option<LanguageRecord>>,
}

impl LanguageStore {
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        bus: EventBus<HeaderEvent>,
        keys: StorageKeys,
    ) -> Self {
        Self {
            storage,
            clock,
            bus,
            keys,
            degraded: Cell::new(false),
            mirror: RefCell::new(None),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// The persisted language, or `None` when absent or not a supported code.
    pub fn get(&self) -> Option<Lang> {
        if self.degraded.get() {
            return self.mirror.borrow().as_ref().map(|record| record.lang);
        }

        match self.storage.get_item(&self.keys.selected_language) {
            Ok(value) => value.and_then(|code| code.parse().ok()),
            Err(e) => {
                tracing::debug!("reading selected language failed: {e}");
                self.mirror.borrow().as_ref().map(|record| record.lang)
            }
        }
    }

    pub fn get_last_change(&self) -> Option<LanguageRecord> {
        if self.degraded.get() {
            return self.mirror.borrow().clone();
        }

        let raw = match self.storage.get_item(&self.keys.last_change) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::debug!("reading last language change failed: {e}");
                return self.mirror.borrow().clone();
            }
        };

        match serde_json::from_str::<LanguageRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("ignoring malformed last language change: {e}");
                None
            }
        }
    }

    /// Persist `lang` as both the selected language and the last change, then
    /// publish `language-changed`.
    ///
    /// The notification is published even when persisting fails; the error is
    /// returned so the caller can decide whether it matters.
    pub fn set(&self, lang: Lang, source: &str) -> Result<LanguageRecord, StorageError> {
        let record = LanguageRecord {
            lang,
            timestamp: self.clock.now_ms(),
            source: source.to_owned(),
        };

        *self.mirror.borrow_mut() = Some(record.clone());
        let persisted = self.persist(&record);

        if persisted.is_err() {
            self.degraded.set(true);
        }

        tracing::debug!(language = %lang, source, "language set");

        self.bus.emit(HeaderEvent::LanguageChanged {
            language: lang,
            source: source.to_owned(),
        });

        persisted.map(|()| record)
    }

    /// Publish `language-changed` for a value that is already persisted,
    /// such as one written by another tab. Nothing is written back.
    pub fn announce(&self, lang: Lang, source: &str) {
        tracing::debug!(language = %lang, source, "language announced");

        self.bus.emit(HeaderEvent::LanguageChanged {
            language: lang,
            source: source.to_owned(),
        });
    }

    fn persist(&self, record: &LanguageRecord) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(record).map_err(|e| StorageError::Malformed {
            key: self.keys.last_change.clone(),
            reason: e.to_string(),
        })?;

        self.storage
            .set_item(&self.keys.selected_language, record.lang.code())?;
        self.storage.set_item(&self.keys.last_change, &encoded)
    }
}

impl fmt::Debug for LanguageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageStore")
            .field("keys", &self.keys)
            .field("degraded", &self.degraded.get())
            .finish()
    }
}

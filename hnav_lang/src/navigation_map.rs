use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use hnav_utils::query::split_path_query;
use hnav_utils::{EventBus, HeaderEvent, Lang, SubscriptionId, language_of, strip_prefix};

use crate::clock::Clock;
use crate::language_store::LanguageRecord;
use crate::store::{KeyValueStore, StorageError};

/// Session-scoped prediction of which language a page was last shown in.
///
/// Entries are keyed by the unprefixed path plus query, so `/en/about?x=1`
/// and `/th/about?x=1` share one entry. Nothing is evicted; the map lives as
/// long as the tab's session storage.
pub struct NavigationLanguageMap {
    session: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    key: String,
    memory: RefCell<HashMap<String, LanguageRecord>>,
}

impl NavigationLanguageMap {
    pub fn new(session: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>, key: impl Into<String>) -> Self {
        Self {
            session,
            clock,
            key: key.into(),
            memory: RefCell::new(HashMap::new()),
        }
    }

    pub fn entry_key(url: &str) -> String {
        let (path, query) = split_path_query(url);
        format!("{}{query}", strip_prefix(path))
    }

    pub fn lookup(&self, url: &str) -> Option<LanguageRecord> {
        self.load().remove(&Self::entry_key(url))
    }

    pub fn record(&self, url: &str, lang: Lang, source: &str) -> Result<LanguageRecord, StorageError> {
        let record = LanguageRecord {
            lang,
            timestamp: self.clock.now_ms(),
            source: source.to_owned(),
        };

        let mut entries = self.load();
        entries.insert(Self::entry_key(url), record.clone());

        let saved = self.save(&entries);
        *self.memory.borrow_mut() = entries;

        saved.map(|()| record)
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self) -> HashMap<String, LanguageRecord> {
        match self.session.get_item(&self.key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::debug!("discarding malformed navigation language map: {e}");
                HashMap::new()
            }),
            Ok(None) => HashMap::new(),
            Err(_) => self.memory.borrow().clone(),
        }
    }

    fn save(&self, entries: &HashMap<String, LanguageRecord>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(entries).map_err(|e| StorageError::Malformed {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;

        self.session.set_item(&self.key, &encoded)
    }
}

impl fmt::Debug for NavigationLanguageMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationLanguageMap")
            .field("key", &self.key)
            .finish()
    }
}

/// Records the language of every URL written to history into the map.
#[derive(Debug)]
pub struct NavigationMapRecorder;

impl NavigationMapRecorder {
    pub fn attach(map: Rc<NavigationLanguageMap>, bus: &EventBus<HeaderEvent>) -> SubscriptionId {
        bus.subscribe(move |event: &HeaderEvent| {
            let HeaderEvent::HistoryChanged { url, .. } = event else {
                return;
            };

            let Some(lang) = language_of(split_path_query(url).0) else {
                return;
            };

            if let Err(e) = map.record(url, lang, "history") {
                tracing::warn!("could not record language for {url}: {e}");
            }
        })
    }
}

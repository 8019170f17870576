use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use hnav_utils::{EventBus, HeaderEvent, Lang};

use crate::enforcer::{Enforcement, UrlEnforcer};
use crate::language_store::LanguageStore;

/// Converges this tab on a language chosen in another tab.
///
/// Storage events only fire for writes made elsewhere, so anything reaching
/// `handle_storage_event` is a foreign decision.
pub struct LanguageSync {
    store: Rc<LanguageStore>,
    enforcer: Rc<UrlEnforcer>,
    displayed: Rc<Cell<Option<Lang>>>,
}

impl LanguageSync {
    pub fn attach(
        store: Rc<LanguageStore>,
        enforcer: Rc<UrlEnforcer>,
        bus: EventBus<HeaderEvent>,
    ) -> Rc<Self> {
        let displayed = Rc::new(Cell::new(store.get()));

        {
            let displayed = displayed.clone();
            bus.subscribe(move |event: &HeaderEvent| {
                if let HeaderEvent::LanguageChanged { language, .. } = event {
                    displayed.set(Some(*language));
                }
            });
        }

        Rc::new(Self {
            store,
            enforcer,
            displayed,
        })
    }

    pub fn displayed(&self) -> Option<Lang> {
        self.displayed.get()
    }

    /// `key` is `None` when the other tab cleared storage entirely.
    pub fn handle_storage_event(&self, key: Option<&str>) -> Option<Enforcement> {
        if let Some(key) = key
            && !self.store.keys().is_language_key(key)
        {
            return None;
        }

        let enforcement = self.enforcer.on_navigation_event();
        let language = enforcement.decision().lang;

        if self.displayed.get() != Some(language) {
            tracing::info!(language = %language, "language changed in another tab");
            self.store.announce(language, "cross-tab");
        }

        Some(enforcement)
    }
}

impl fmt::Debug for LanguageSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageSync")
            .field("displayed", &self.displayed.get())
            .finish()
    }
}

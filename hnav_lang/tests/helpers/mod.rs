use std::cell::RefCell;
use std::rc::Rc;

use hnav_lang::{
    EnforcerOptions, LanguageStore, ManualClock, MemoryStore, NavigationLanguageMap, StorageKeys,
    UrlEnforcer,
};
use hnav_utils::{EventBus, HeaderEvent, Lang, MemoryHistory};

pub(crate) struct Fixture {
    pub(crate) history: Rc<MemoryHistory>,
    pub(crate) local: Rc<MemoryStore>,
    pub(crate) session: Rc<MemoryStore>,
    pub(crate) clock: Rc<ManualClock>,
    pub(crate) bus: EventBus<HeaderEvent>,
    pub(crate) store: Rc<LanguageStore>,
    pub(crate) map: Rc<NavigationLanguageMap>,
    pub(crate) events: Rc<RefCell<Vec<HeaderEvent>>>,
}

impl Fixture {
    pub(crate) fn new(url: &str) -> Self {
        Self::with_session(url, Rc::new(MemoryStore::new()))
    }

    /// Shares session storage with an earlier fixture, like a second script
    /// evaluated in the same tab.
    pub(crate) fn with_session(url: &str, session: Rc<MemoryStore>) -> Self {
        let history = Rc::new(MemoryHistory::new(url));
        let local = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock::new(10_000));
        let bus = EventBus::new();
        let keys = StorageKeys::default();

        let store = Rc::new(LanguageStore::new(
            local.clone(),
            clock.clone(),
            bus.clone(),
            keys.clone(),
        ));
        let map = Rc::new(NavigationLanguageMap::new(
            session.clone(),
            clock.clone(),
            keys.navigation_map,
        ));

        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = events.clone();
            bus.subscribe(move |event: &HeaderEvent| events.borrow_mut().push(event.clone()));
        }

        Self {
            history,
            local,
            session,
            clock,
            bus,
            store,
            map,
            events,
        }
    }

    pub(crate) fn enforcer(&self, browser_lang: Option<Lang>) -> Rc<UrlEnforcer> {
        Rc::new(UrlEnforcer::new(
            self.history.clone(),
            self.store.clone(),
            self.map.clone(),
            self.session.clone(),
            self.clock.clone(),
            self.bus.clone(),
            EnforcerOptions {
                browser_lang,
                ..EnforcerOptions::default()
            },
        ))
    }

    pub(crate) fn language_events(&self) -> Vec<HeaderEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|event| matches!(event, HeaderEvent::LanguageChanged { .. }))
            .cloned()
            .collect()
    }
}

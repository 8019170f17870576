use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::history::HistoryMethod;
use crate::lang::Lang;

/// Notifications published between the header components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEvent {
    LanguageChanged {
        language: Lang,
        source: String,
    },
    HistoryChanged {
        method: HistoryMethod,
        url: String,
    },
    UrlChanged {
        url: String,
        main_route: String,
        sub_route: String,
    },
    RouteChanged {
        main: String,
        sub: String,
    },
}

impl HeaderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HeaderEvent::LanguageChanged { .. } => "language-changed",
            HeaderEvent::HistoryChanged { .. } => "history-changed",
            HeaderEvent::UrlChanged { .. } => "url-changed",
            HeaderEvent::RouteChanged { .. } => "route-changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(usize);

type Listener<E> = Rc<dyn Fn(&E)>;

struct Listeners<E> {
    next_id: usize,
    entries: BTreeMap<usize, Listener<E>>,
}

/// Synchronous in-process publish/subscribe.
///
/// Listeners run in subscription order on the emitting call stack. A listener
/// may subscribe or emit again while being notified; it only sees listeners
/// that were registered when the outer `emit` started.
pub struct EventBus<E> {
    listeners: Rc<RefCell<Listeners<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: BTreeMap::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Rc::new(listener));

        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().entries.remove(&id.0).is_some()
    }

    pub fn emit(&self, event: E) {
        let snapshot: Vec<Listener<E>> = self.listeners.borrow().entries.values().cloned().collect();

        for listener in snapshot {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn listeners_run_in_subscription_order() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let seen = seen.clone();
            bus.subscribe(move |value: &u32| seen.borrow_mut().push(format!("{tag}{value}")));
        }

        bus.emit(7);
        assert_eq!(*seen.borrow(), vec!["a7", "b7", "c7"]);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let bus = EventBus::<()>::new();
        let calls = Rc::new(Cell::new(0));

        let id = {
            let calls = calls.clone();
            bus.subscribe(move |_| calls.set(calls.get() + 1))
        };

        bus.emit(());
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(());

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listener_may_reenter_the_bus() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        {
            let bus_inner = bus.clone();
            let seen = seen.clone();
            bus.subscribe(move |value: &u32| {
                seen.borrow_mut().push(*value);
                if *value == 1 {
                    bus_inner.emit(2);
                    bus_inner.subscribe(|_| {});
                }
            });
        }

        bus.emit(1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn event_names_match_published_names() {
        let event = HeaderEvent::RouteChanged {
            main: "news".to_owned(),
            sub: String::new(),
        };
        assert_eq!(event.name(), "route-changed");
    }
}

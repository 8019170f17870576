use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use hnav_router::{
    ButtonConfiguration, ChromeError, ContentError, ContentItem, ContentSource, ContentView,
    LoadingIndicator, MainButton, NavigationChrome, Notifier, Router, RouterDeps, RouterOptions,
    Timer, Viewport,
};
use hnav_utils::{EventBus, HeaderEvent, MemoryHistory};

pub(crate) const CONFIG: &str = r#"{
    "mainButtons": [
        { "url": "A", "jsonFile": "a.json", "isDefault": true, "en": "Alpha" },
        {
            "url": "B",
            "jsonFile": "b.json",
            "en": "Beta",
            "subButtons": [
                { "url": "b1", "jsonFile": "b1.json", "isDefault": true, "en": "One" },
                { "url": "b2", "jsonFile": "b2.json", "en": "Two" }
            ]
        }
    ]
}"#;

enum Reply {
    Items(Vec<ContentItem>),
    Fail,
    Pending(oneshot::Receiver<Vec<ContentItem>>),
    Never,
}

#[derive(Default)]
pub(crate) struct FakeContent {
    replies: RefCell<HashMap<String, Reply>>,
    pub(crate) requests: RefCell<Vec<String>>,
}

impl FakeContent {
    pub(crate) fn items(&self, resource: &str, items: Vec<ContentItem>) {
        self.replies
            .borrow_mut()
            .insert(resource.to_owned(), Reply::Items(items));
    }

    pub(crate) fn fail(&self, resource: &str) {
        self.replies.borrow_mut().insert(resource.to_owned(), Reply::Fail);
    }

    pub(crate) fn never(&self, resource: &str) {
        self.replies.borrow_mut().insert(resource.to_owned(), Reply::Never);
    }

    pub(crate) fn pending(&self, resource: &str) -> oneshot::Sender<Vec<ContentItem>> {
        let (sender, receiver) = oneshot::channel();
        self.replies
            .borrow_mut()
            .insert(resource.to_owned(), Reply::Pending(receiver));
        sender
    }
}

impl ContentSource for FakeContent {
    fn load(&self, resource: &str) -> LocalBoxFuture<'static, Result<Vec<ContentItem>, ContentError>> {
        self.requests.borrow_mut().push(resource.to_owned());
        let resource = resource.to_owned();

        match self.replies.borrow_mut().remove(&resource) {
            Some(Reply::Items(items)) => async move { Ok(items) }.boxed_local(),
            Some(Reply::Pending(receiver)) => async move {
                receiver.await.map_err(|_| ContentError::Network {
                    resource,
                    reason: "cancelled".to_owned(),
                })
            }
            .boxed_local(),
            Some(Reply::Never) => futures::future::pending().boxed_local(),
            Some(Reply::Fail) | None => async move {
                Err(ContentError::Status {
                    resource,
                    status: 404,
                })
            }
            .boxed_local(),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingView {
    pub(crate) clears: Cell<usize>,
    pub(crate) renders: RefCell<Vec<Vec<ContentItem>>>,
}

impl ContentView for RecordingView {
    fn clear(&self) {
        self.clears.set(self.clears.get() + 1);
    }

    fn render(&self, items: &[ContentItem]) {
        self.renders.borrow_mut().push(items.to_vec());
    }
}

#[derive(Default)]
pub(crate) struct CountingLoader {
    pub(crate) shown: Cell<usize>,
    pub(crate) hidden: Cell<usize>,
    pub(crate) forced: Cell<usize>,
}

impl LoadingIndicator for CountingLoader {
    fn show(&self) {
        self.shown.set(self.shown.get() + 1);
    }

    fn hide(&self) {
        self.hidden.set(self.hidden.get() + 1);
    }

    fn force_hide(&self) {
        self.forced.set(self.forced.get() + 1);
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) messages: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn show_error(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_owned());
    }
}

#[derive(Default)]
pub(crate) struct FakeViewport {
    pub(crate) offset: Cell<f64>,
    pub(crate) scrolled_to_top: Cell<usize>,
}

impl Viewport for FakeViewport {
    fn scroll_y(&self) -> f64 {
        self.offset.get()
    }

    fn scroll_to_top(&self) {
        self.scrolled_to_top.set(self.scrolled_to_top.get() + 1);
        self.offset.set(0.0);
    }
}

/// `instant` makes every deadline expire immediately.
#[derive(Default)]
pub(crate) struct FakeTimer {
    pub(crate) instant: Cell<bool>,
}

impl Timer for FakeTimer {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        if self.instant.get() {
            futures::future::ready(()).boxed_local()
        } else {
            futures::future::pending().boxed_local()
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingChrome {
    pub(crate) active: RefCell<Vec<(String, Option<String>)>>,
    pub(crate) sub_menus: RefCell<Vec<(Option<String>, Option<String>)>>,
    pub(crate) cleared: Cell<usize>,
    pub(crate) broken: Cell<bool>,
}

impl NavigationChrome for RecordingChrome {
    fn set_active(&self, main: &str, sub: Option<&str>) {
        self.active
            .borrow_mut()
            .push((main.to_owned(), sub.map(str::to_owned)));
    }

    fn render_sub_buttons(&self, parent: &MainButton, active: Option<&str>) -> Result<(), ChromeError> {
        if self.broken.get() {
            return Err(ChromeError("sub-navigation container missing".to_owned()));
        }

        self.sub_menus
            .borrow_mut()
            .push((parent.route_id(), active.map(str::to_owned)));
        Ok(())
    }

    fn clear_sub_buttons(&self) {
        self.cleared.set(self.cleared.get() + 1);
    }
}

pub(crate) struct Harness {
    pub(crate) router: Router,
    pub(crate) history: Rc<MemoryHistory>,
    pub(crate) content: Rc<FakeContent>,
    pub(crate) view: Rc<RecordingView>,
    pub(crate) loading: Rc<CountingLoader>,
    pub(crate) notifier: Rc<RecordingNotifier>,
    pub(crate) viewport: Rc<FakeViewport>,
    pub(crate) timer: Rc<FakeTimer>,
    pub(crate) chrome: Rc<RecordingChrome>,
    pub(crate) events: Rc<RefCell<Vec<HeaderEvent>>>,
}

impl Harness {
    pub(crate) fn new(url: &str) -> Self {
        let harness = Self::without_config(url);
        harness
            .router
            .set_config(Rc::new(ButtonConfiguration::from_json(CONFIG).unwrap()));
        harness
    }

    pub(crate) fn without_config(url: &str) -> Self {
        let history = Rc::new(MemoryHistory::new(url));
        let content = Rc::new(FakeContent::default());
        let view = Rc::new(RecordingView::default());
        let loading = Rc::new(CountingLoader::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let viewport = Rc::new(FakeViewport::default());
        let timer = Rc::new(FakeTimer::default());
        let chrome = Rc::new(RecordingChrome::default());
        let bus = EventBus::new();

        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = events.clone();
            bus.subscribe(move |event: &HeaderEvent| events.borrow_mut().push(event.clone()));
        }

        let router = Router::new(
            RouterDeps {
                history: history.clone(),
                content: content.clone(),
                view: view.clone(),
                loading: loading.clone(),
                notifier: notifier.clone(),
                viewport: viewport.clone(),
                timer: timer.clone(),
                chrome: chrome.clone(),
                bus,
            },
            RouterOptions::default(),
        );

        Self {
            router,
            history,
            content,
            view,
            loading,
            notifier,
            viewport,
            timer,
            chrome,
            events,
        }
    }

    pub(crate) fn events_named(&self, name: &str) -> Vec<HeaderEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.name() == name)
            .cloned()
            .collect()
    }
}

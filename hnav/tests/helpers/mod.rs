use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use hnav::hnav_components::{ButtonSurface, ButtonView, ClickHandler};
use hnav::hnav_lang::{ManualClock, MemoryStore};
use hnav::hnav_router::{
    ChromeError, ContentError, ContentItem, ContentSource, ContentView, LoadingIndicator,
    Notifier, Timer, Viewport,
};
use hnav::hnav_utils::{HeaderEvent, MemoryHistory};
use hnav::{HeaderApp, HeaderSettings, Platform, Spawner};

pub(crate) const CONFIG: &str = r#"{
    "mainButtons": [
        { "url": "A", "jsonFile": "a.json", "isDefault": true, "en": "Alpha", "th": "อัลฟา" },
        {
            "url": "B",
            "jsonFile": "b.json",
            "en": "Beta",
            "th": "เบตา",
            "subButtons": [
                { "url": "b1", "jsonFile": "b1.json", "isDefault": true, "en": "One", "th": "หนึ่ง" },
                { "url": "b2", "jsonFile": "b2.json", "en": "Two" }
            ]
        }
    ]
}"#;

#[derive(Default)]
pub(crate) struct StaticContent {
    items: RefCell<HashMap<String, Vec<ContentItem>>>,
}

impl StaticContent {
    pub(crate) fn serve(&self, resource: &str, items: Vec<ContentItem>) {
        self.items.borrow_mut().insert(resource.to_owned(), items);
    }
}

impl ContentSource for StaticContent {
    fn load(&self, resource: &str) -> LocalBoxFuture<'static, Result<Vec<ContentItem>, ContentError>> {
        let reply = self.items.borrow().get(resource).cloned().ok_or(ContentError::Status {
            resource: resource.to_owned(),
            status: 404,
        });

        futures::future::ready(reply).boxed_local()
    }
}

#[derive(Default)]
pub(crate) struct RecordingView {
    pub(crate) renders: RefCell<Vec<Vec<ContentItem>>>,
}

impl ContentView for RecordingView {
    fn clear(&self) {}

    fn render(&self, items: &[ContentItem]) {
        self.renders.borrow_mut().push(items.to_vec());
    }
}

#[derive(Default)]
pub(crate) struct QuietLoader;

impl LoadingIndicator for QuietLoader {
    fn show(&self) {}

    fn hide(&self) {}
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
pub(crate) struct StillViewport;

impl Viewport for StillViewport {
    fn scroll_y(&self) -> f64 {
        0.0
    }

    fn scroll_to_top(&self) {}
}

/// Deadlines never expire.
#[derive(Default)]
pub(crate) struct PatientTimer;

impl Timer for PatientTimer {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        futures::future::pending().boxed_local()
    }
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub(crate) mains: RefCell<Vec<Vec<ButtonView>>>,
    pub(crate) subs: RefCell<Vec<(String, Vec<ButtonView>)>>,
    pub(crate) marks: RefCell<Vec<(String, Option<String>)>>,
    pub(crate) cleared: Cell<usize>,
    pub(crate) handler: RefCell<Option<ClickHandler>>,
}

impl RecordingSurface {
    pub(crate) fn main_labels(&self) -> Vec<String> {
        self.mains
            .borrow()
            .last()
            .map(|views| views.iter().map(|view| view.label.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn click(&self, href: &str) {
        let handler = self.handler.borrow().clone().expect("buttons rendered");
        handler(href.into());
    }
}

impl ButtonSurface for RecordingSurface {
    fn render_main(&self, buttons: &[ButtonView], on_click: ClickHandler) -> Result<(), ChromeError> {
        self.mains.borrow_mut().push(buttons.to_vec());
        *self.handler.borrow_mut() = Some(on_click);
        Ok(())
    }

    fn render_sub(
        &self,
        parent: &str,
        buttons: &[ButtonView],
        _on_click: ClickHandler,
    ) -> Result<(), ChromeError> {
        self.subs.borrow_mut().push((parent.to_owned(), buttons.to_vec()));
        Ok(())
    }

    fn clear_sub(&self) {
        self.cleared.set(self.cleared.get() + 1);
    }

    fn mark_active(&self, main: &str, sub: Option<&str>) {
        self.marks
            .borrow_mut()
            .push((main.to_owned(), sub.map(str::to_owned)));
    }
}

/// Holds spawned tasks until the test drives them.
#[derive(Default)]
pub(crate) struct QueueSpawner {
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl QueueSpawner {
    pub(crate) fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub(crate) async fn run_all(&self) {
        loop {
            let task = self.tasks.borrow_mut().pop();
            let Some(task) = task else {
                break;
            };
            task.await;
        }
    }
}

impl Spawner for QueueSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }
}

pub(crate) struct Page {
    pub(crate) app: Rc<HeaderApp>,
    pub(crate) history: Rc<MemoryHistory>,
    pub(crate) local: Rc<MemoryStore>,
    pub(crate) clock: Rc<ManualClock>,
    pub(crate) content: Rc<StaticContent>,
    pub(crate) view: Rc<RecordingView>,
    pub(crate) notifier: Rc<RecordingNotifier>,
    pub(crate) surface: Rc<RecordingSurface>,
    pub(crate) spawner: Rc<QueueSpawner>,
    pub(crate) events: Rc<RefCell<Vec<HeaderEvent>>>,
}

impl Page {
    pub(crate) fn new(url: &str) -> Self {
        Self::with(url, HeaderSettings::default(), Rc::new(MemoryStore::new()), None)
    }

    pub(crate) fn with(
        url: &str,
        settings: HeaderSettings,
        local: Rc<MemoryStore>,
        browser_language: Option<&str>,
    ) -> Self {
        let history = Rc::new(MemoryHistory::new(url));
        let clock = Rc::new(ManualClock::new(10_000));
        let content = Rc::new(StaticContent::default());
        let view = Rc::new(RecordingView::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let surface = Rc::new(RecordingSurface::default());
        let spawner = Rc::new(QueueSpawner::default());

        let app = HeaderApp::new(settings, Platform {
            history: history.clone(),
            local: local.clone(),
            session: Rc::new(MemoryStore::new()),
            clock: clock.clone(),
            content: content.clone(),
            view: view.clone(),
            loading: Rc::new(QuietLoader),
            notifier: notifier.clone(),
            viewport: Rc::new(StillViewport),
            timer: Rc::new(PatientTimer),
            surface: surface.clone(),
            spawner: spawner.clone(),
            browser_language: browser_language.map(str::to_owned),
        });

        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let events = events.clone();
            app.bus()
                .subscribe(move |event: &HeaderEvent| events.borrow_mut().push(event.clone()));
        }

        Self {
            app,
            history,
            local,
            clock,
            content,
            view,
            notifier,
            surface,
            spawner,
            events,
        }
    }

    pub(crate) fn configured(url: &str) -> Self {
        let page = Self::new(url);
        page.app.install_config_json(CONFIG).unwrap();
        page
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

//! Browser bindings: `web_sys` adapters for the core traits and the two
//! `#[wasm_bindgen]` entry points a page calls.
//!
//! `boot` runs from a `<head>` script before anything renders and may
//! redirect; `mount` runs once the DOM is ready.

mod dom;
mod fetch;
mod globals;
mod history;
mod listeners;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use hnav_lang::{BootOutcome, SystemClock};
use tracing::Level;
use wasm_bindgen::prelude::*;

use crate::{AppError, HeaderApp, HeaderSettings, Platform, Spawner, init_logging};

use dom::{DomButtonSurface, DomContentView, LoadingOverlay, Toast, WindowViewport};
use fetch::{BrowserTimer, FetchContentSource, fetch_text};
use history::BrowserHistory;
use storage::WebStorage;

thread_local! {
    static APP: RefCell<Option<Rc<HeaderApp>>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, Copy)]
struct LocalSpawner;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    init_logging(Level::INFO);
}

fn to_js(error: AppError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn app() -> Result<Rc<HeaderApp>, AppError> {
    if let Some(app) = APP.with(|cell| cell.borrow().clone()) {
        return Ok(app);
    }

    let app = build_app()?;
    APP.with(|cell| *cell.borrow_mut() = Some(app.clone()));

    Ok(app)
}

fn build_app() -> Result<Rc<HeaderApp>, AppError> {
    let window = web_sys::window().ok_or_else(|| AppError::Browser("no global window".to_owned()))?;
    let document = window
        .document()
        .ok_or_else(|| AppError::Browser("no document".to_owned()))?;

    let settings: HeaderSettings = globals::read_global("HEADER_SETTINGS").unwrap_or_default();

    let platform = Platform {
        history: Rc::new(BrowserHistory::new(window.clone())),
        local: Rc::new(WebStorage::local(&window)),
        session: Rc::new(WebStorage::session(&window)),
        clock: Rc::new(SystemClock),
        content: Rc::new(FetchContentSource::new(window.clone())),
        view: Rc::new(DomContentView::new(document.clone())),
        loading: Rc::new(LoadingOverlay::new(document.clone())),
        notifier: Rc::new(Toast::new(window.clone(), document.clone(), settings.notification_ms)),
        viewport: Rc::new(WindowViewport::new(window.clone())),
        timer: Rc::new(BrowserTimer::new(window.clone())),
        surface: Rc::new(DomButtonSurface::new(document)),
        spawner: Rc::new(LocalSpawner),
        browser_language: window.navigator().language(),
    };

    Ok(HeaderApp::new(settings, platform))
}

/// Enforce the language prefix before the page renders. Returns `true` when
/// the page is being replaced and the caller should stop.
#[wasm_bindgen]
pub fn boot() -> Result<bool, JsValue> {
    init();
    let app = app().map_err(to_js)?;

    Ok(matches!(
        app.boot(),
        BootOutcome::Redirected { .. } | BootOutcome::RedirectInFlight { .. }
    ))
}

/// Load the button configuration, draw the header and show the first page.
#[wasm_bindgen]
pub async fn mount() -> Result<(), JsValue> {
    init();
    let app = app().map_err(to_js)?;

    let window = web_sys::window().ok_or("no global window")?;
    let document = window.document().ok_or("no document")?;

    listeners::install(&app, &window, &document).map_err(to_js)?;
    listeners::localize_links(&app, &document);

    let url = app.settings().buttons_url.clone();
    match fetch_text(&window, &url).await {
        Ok(json) => {
            if let Err(e) = app.install_config_json(&json) {
                tracing::error!("button configuration from {url} rejected: {e}");
            }
        }
        Err(e) => tracing::error!("button configuration {url} not loaded: {e}"),
    }

    // without a configuration this reports the failure to the user
    app.start().await;

    Ok(())
}

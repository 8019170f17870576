use std::rc::Rc;

use hnav_utils::{HeaderEvent, Lang};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, Element, Event, StorageEvent, Window};

use super::dom::anchors;
use super::globals::js_error;
use crate::{AppError, HeaderApp, event_detail};

fn browser_error(value: JsValue) -> AppError {
    AppError::Browser(js_error(value))
}

/// Rewrite every internal link on the page for the current language.
pub(crate) fn localize_links(app: &HeaderApp, document: &Document) {
    let Some(body) = document.body() else {
        return;
    };
    let origin = document.location().and_then(|location| location.origin().ok());

    for anchor in anchors(&body) {
        localize_anchor(app, &anchor, origin.as_deref());
    }
}

fn localize_anchor(app: &HeaderApp, anchor: &Element, origin: Option<&str>) {
    let Some(href) = anchor.get_attribute("href") else {
        return;
    };

    if let Some(localized) = app.localize(&href, origin)
        && let Err(e) = anchor.set_attribute("href", &localized)
    {
        tracing::warn!("link {href} not localized: {}", js_error(e));
    }
}

/// Back/forward, cross-tab storage writes, the language toggle and clicks on
/// links injected after load.
pub(crate) fn install(app: &Rc<HeaderApp>, window: &Window, document: &Document) -> Result<(), AppError> {
    let popstate = {
        let app = app.clone();
        Closure::wrap(Box::new(move |_event: Event| {
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                app.handle_popstate().await;
            });
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())
        .map_err(browser_error)?;
    popstate.forget();

    let storage = {
        let app = app.clone();
        Closure::wrap(Box::new(move |event: StorageEvent| {
            app.handle_storage_event(event.key().as_deref());
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("storage", storage.as_ref().unchecked_ref())
        .map_err(browser_error)?;
    storage.forget();

    let click = {
        let app = app.clone();
        let document = document.clone();
        Closure::wrap(Box::new(move |event: Event| {
            let Some(target) = event.target().and_then(|target| target.dyn_into::<Element>().ok()) else {
                return;
            };

            if let Ok(Some(toggle)) = target.closest("[data-lang]") {
                let choice = toggle.get_attribute("data-lang").and_then(|code| code.parse::<Lang>().ok());
                if let Some(lang) = choice {
                    event.prevent_default();
                    if let Err(e) = app.switch_language(lang) {
                        tracing::warn!("language toggle ignored: {e}");
                    }
                }
                return;
            }

            if let Ok(Some(anchor)) = target.closest("a[href]") {
                let origin = document.location().and_then(|location| location.origin().ok());
                localize_anchor(&app, &anchor, origin.as_deref());
            }
        }) as Box<dyn FnMut(_)>)
    };
    document
        .add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
        .map_err(browser_error)?;
    click.forget();

    let weak = Rc::downgrade(app);
    let target = window.clone();
    let document = document.clone();
    app.bus().subscribe(move |event: &HeaderEvent| {
        if matches!(event, HeaderEvent::LanguageChanged { .. })
            && let Some(app) = weak.upgrade()
        {
            localize_links(&app, &document);
        }

        dispatch(&target, event);
    });

    Ok(())
}

/// Re-publish a header event as a DOM `CustomEvent` for other page scripts.
fn dispatch(window: &Window, event: &HeaderEvent) {
    let detail = serde_json::to_string(&event_detail(event))
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL);

    let init = CustomEventInit::new();
    init.set_detail(&detail);

    let dispatched = CustomEvent::new_with_event_init_dict(event.name(), &init)
        .and_then(|custom| window.dispatch_event(&custom));

    if let Err(e) = dispatched {
        tracing::warn!("{} not dispatched: {}", event.name(), js_error(e));
    }
}

use std::cell::{Cell, RefCell};
use std::fmt;

use hnav_components::{ButtonSurface, ButtonView, ClickHandler};
use hnav_router::{
    ChromeError, ContentItem, ContentView, LoadingIndicator, Notifier, RouteInput, Viewport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, MouseEvent, Window};

use super::globals::js_error;

pub(crate) const CONTENT_ID: &str = "content";
pub(crate) const MAIN_NAV_ID: &str = "main-nav";
pub(crate) const SUB_NAV_ID: &str = "sub-nav";
const OVERLAY_ID: &str = "hnav-loading";

type ClickListener = Closure<dyn FnMut(MouseEvent)>;

fn elements(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn text_field<'a>(item: &'a ContentItem, name: &str) -> Option<&'a str> {
    item.get(name).and_then(|value| value.as_str())
}

/// Renders content items as plain cards. Text goes through `textContent`.
#[derive(Debug, Clone)]
pub(crate) struct DomContentView {
    document: Document,
}

impl DomContentView {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn card(&self, item: &ContentItem) -> Result<Element, wasm_bindgen::JsValue> {
        let card = self.document.create_element("article")?;
        card.set_class_name("content-item");

        if let Some(text) = item.as_str() {
            card.set_text_content(Some(text));
            return Ok(card);
        }

        if let Some(title) = text_field(item, "title") {
            let heading = self.document.create_element("h3")?;
            heading.set_text_content(Some(title));
            card.append_child(&heading)?;
        }

        if let Some(body) = text_field(item, "description").or_else(|| text_field(item, "text")) {
            let paragraph = self.document.create_element("p")?;
            paragraph.set_text_content(Some(body));
            card.append_child(&paragraph)?;
        }

        if let Some(url) = text_field(item, "url") {
            let link = self.document.create_element("a")?;
            link.set_attribute("href", url)?;
            link.set_text_content(Some(text_field(item, "linkText").unwrap_or(url)));
            card.append_child(&link)?;
        }

        Ok(card)
    }
}

impl ContentView for DomContentView {
    fn clear(&self) {
        if let Some(container) = self.document.get_element_by_id(CONTENT_ID) {
            container.set_inner_html("");
        }
    }

    fn render(&self, items: &[ContentItem]) {
        let Some(container) = self.document.get_element_by_id(CONTENT_ID) else {
            tracing::warn!("#{CONTENT_ID} is missing, {} items not shown", items.len());
            return;
        };

        for item in items {
            let appended = self
                .card(item)
                .and_then(|card| container.append_child(&card).map(|_| ()));

            if let Err(e) = appended {
                tracing::warn!("content item not rendered: {}", js_error(e));
            }
        }
    }
}

/// Buttons inside `#main-nav` and `#sub-nav`. Listeners of replaced buttons
/// are dropped together with them.
pub(crate) struct DomButtonSurface {
    document: Document,
    main_listeners: RefCell<Vec<ClickListener>>,
    sub_listeners: RefCell<Vec<ClickListener>>,
}

impl DomButtonSurface {
    pub(crate) fn new(document: Document) -> Self {
        Self {
            document,
            main_listeners: RefCell::new(Vec::new()),
            sub_listeners: RefCell::new(Vec::new()),
        }
    }

    fn container(&self, id: &str) -> Result<Element, ChromeError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| ChromeError(format!("#{id} is missing")))
    }

    fn fill(
        &self,
        container: &Element,
        buttons: &[ButtonView],
        on_click: &ClickHandler,
    ) -> Result<Vec<ClickListener>, ChromeError> {
        container.set_inner_html("");
        let mut listeners = Vec::with_capacity(buttons.len());

        for view in buttons {
            let button = self.button(view).map_err(|e| ChromeError(js_error(e)))?;

            let listener = {
                let on_click = on_click.clone();
                let href = view.href.clone();
                Closure::wrap(Box::new(move |event: MouseEvent| {
                    event.prevent_default();
                    on_click(RouteInput::from(href.as_str()));
                }) as Box<dyn FnMut(_)>)
            };

            button
                .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
                .map_err(|e| ChromeError(js_error(e)))?;
            container
                .append_child(&button)
                .map_err(|e| ChromeError(js_error(e)))?;

            listeners.push(listener);
        }

        Ok(listeners)
    }

    fn button(&self, view: &ButtonView) -> Result<Element, wasm_bindgen::JsValue> {
        let button = self.document.create_element("button")?;
        button.set_attribute("type", "button")?;
        button.set_attribute("data-route", &view.route_id)?;
        button.set_attribute("data-href", &view.href)?;
        button.set_class_name(if view.active { "nav-button active" } else { "nav-button" });
        button.set_text_content(Some(&view.label));

        Ok(button)
    }

    fn mark(&self, id: &str, route: Option<&str>) {
        let Some(container) = self.document.get_element_by_id(id) else {
            return;
        };

        for button in elements(&container, "[data-route]") {
            let active = route.is_some() && button.get_attribute("data-route").as_deref() == route;
            // toggling only fails for invalid tokens
            let _ = button.class_list().toggle_with_force("active", active);
        }
    }
}

impl ButtonSurface for DomButtonSurface {
    fn render_main(&self, buttons: &[ButtonView], on_click: ClickHandler) -> Result<(), ChromeError> {
        let container = self.container(MAIN_NAV_ID)?;
        let listeners = self.fill(&container, buttons, &on_click)?;
        *self.main_listeners.borrow_mut() = listeners;

        Ok(())
    }

    fn render_sub(
        &self,
        parent: &str,
        buttons: &[ButtonView],
        on_click: ClickHandler,
    ) -> Result<(), ChromeError> {
        let container = self.container(SUB_NAV_ID)?;
        let listeners = self.fill(&container, buttons, &on_click)?;
        *self.sub_listeners.borrow_mut() = listeners;

        container
            .set_attribute("data-parent", parent)
            .map_err(|e| ChromeError(js_error(e)))?;
        container
            .remove_attribute("hidden")
            .map_err(|e| ChromeError(js_error(e)))
    }

    fn clear_sub(&self) {
        if let Some(container) = self.document.get_element_by_id(SUB_NAV_ID) {
            container.set_inner_html("");
            let _ = container.set_attribute("hidden", "");
        }

        self.sub_listeners.borrow_mut().clear();
    }

    fn mark_active(&self, main: &str, sub: Option<&str>) {
        self.mark(MAIN_NAV_ID, Some(main));
        self.mark(SUB_NAV_ID, sub);
    }
}

impl fmt::Debug for DomButtonSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomButtonSurface")
            .field("main_listeners", &self.main_listeners.borrow().len())
            .field("sub_listeners", &self.sub_listeners.borrow().len())
            .finish()
    }
}

/// Full-page overlay. Every `show` needs a matching `hide`.
#[derive(Debug)]
pub(crate) struct LoadingOverlay {
    document: Document,
    depth: Cell<u32>,
}

impl LoadingOverlay {
    pub(crate) fn new(document: Document) -> Self {
        Self {
            document,
            depth: Cell::new(0),
        }
    }

    fn overlay(&self) -> Option<Element> {
        if let Some(existing) = self.document.get_element_by_id(OVERLAY_ID) {
            return Some(existing);
        }

        let overlay = self.document.create_element("div").ok()?;
        overlay.set_id(OVERLAY_ID);
        overlay.set_class_name("loading-overlay");
        overlay.set_attribute("aria-hidden", "true").ok()?;
        self.document.body()?.append_child(&overlay).ok()?;

        Some(overlay)
    }

    fn set_visible(&self, visible: bool) {
        if let Some(overlay) = self.overlay() {
            let _ = overlay.class_list().toggle_with_force("visible", visible);
        }
    }
}

impl LoadingIndicator for LoadingOverlay {
    fn show(&self) {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);

        if depth == 1 {
            self.set_visible(true);
        }
    }

    fn hide(&self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);

        if depth == 0 {
            self.set_visible(false);
        }
    }

    fn force_hide(&self) {
        self.depth.set(0);
        self.set_visible(false);
    }
}

/// A dismissible message that removes itself after `lifetime_ms`.
#[derive(Debug, Clone)]
pub(crate) struct Toast {
    window: Window,
    document: Document,
    lifetime_ms: i32,
}

impl Toast {
    pub(crate) fn new(window: Window, document: Document, lifetime_ms: u64) -> Self {
        Self {
            window,
            document,
            lifetime_ms: lifetime_ms.min(i32::MAX as u64) as i32,
        }
    }

    fn build(&self, message: &str) -> Result<Element, wasm_bindgen::JsValue> {
        let toast = self.document.create_element("div")?;
        toast.set_class_name("hnav-toast error");
        toast.set_attribute("role", "alert")?;
        toast.set_text_content(Some(message));

        let body = self.document.body().ok_or("document has no body")?;
        body.append_child(&toast)?;

        let dismiss = {
            let toast = toast.clone();
            Closure::once_into_js(move || toast.remove())
        };
        toast.add_event_listener_with_callback("click", dismiss.unchecked_ref())?;

        let expire = {
            let toast = toast.clone();
            Closure::once_into_js(move || toast.remove())
        };
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(expire.unchecked_ref(), self.lifetime_ms)?;

        Ok(toast)
    }
}

impl Notifier for Toast {
    fn show_error(&self, message: &str) {
        if let Err(e) = self.build(message) {
            tracing::error!("could not show notification `{message}`: {}", js_error(e));
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WindowViewport {
    window: Window,
}

impl WindowViewport {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Viewport for WindowViewport {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or_default()
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}

/// All `a[href]` below `root`.
pub(crate) fn anchors(root: &Element) -> Vec<Element> {
    elements(root, "a[href]")
}

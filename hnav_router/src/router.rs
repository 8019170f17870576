use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::{Either, join, select};
use hnav_utils::{EventBus, HeaderEvent, HistoryApi, HistoryMethod};

use crate::collaborators::{
    ChromeError, ContentError, ContentItem, ContentSource, ContentView, LoadingIndicator,
    NavigationChrome, Notifier, Timer, Viewport,
};
use crate::config::ButtonConfiguration;
use crate::route::{
    self, Route, RouteInput, canonical_query, parse_route, resolve_route,
};

/// Router-owned navigation state. Only the router mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    pub current_main_route: String,
    pub current_sub_route: String,
    pub is_navigating: bool,
    pub previous_url: String,
    pub last_scroll_position: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Write history with `replaceState` even after the first write.
    pub replace: bool,
    /// The address bar already shows the target (popstate).
    pub skip_url_update: bool,
    pub maintain_scroll: bool,
    pub from_history: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigateOutcome {
    Completed(Route),
    /// Another navigation was in progress; nothing was changed.
    Dropped,
    /// An error was reported to the user and the router unlocked.
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("button configuration has not been loaded")]
    ConfigurationMissing,
    #[error("button configuration has no routable buttons")]
    NoRoutes,
    #[error(transparent)]
    Chrome(#[from] ChromeError),
}

/// Everything the router talks to.
pub struct RouterDeps {
    pub history: Rc<dyn HistoryApi>,
    pub content: Rc<dyn ContentSource>,
    pub view: Rc<dyn ContentView>,
    pub loading: Rc<dyn LoadingIndicator>,
    pub notifier: Rc<dyn Notifier>,
    pub viewport: Rc<dyn Viewport>,
    pub timer: Rc<dyn Timer>,
    pub chrome: Rc<dyn NavigationChrome>,
    pub bus: EventBus<HeaderEvent>,
}

#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub fetch_timeout: Duration,
    pub error_message: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            error_message: "Something went wrong while loading this page.".to_owned(),
        }
    }
}

// How a single pass of a navigation ended.
enum Pass {
    Rendered(Route),
    // The address moved while content was loading; holds the new query.
    Superseded(String),
}

// Unlocks the router when the navigation finishes, fails or is dropped mid-await.
struct NavigatingGuard<'a> {
    state: &'a RefCell<NavigationState>,
}

impl<'a> NavigatingGuard<'a> {
    fn engage(state: &'a RefCell<NavigationState>) -> Option<Self> {
        let mut current = state.borrow_mut();
        if current.is_navigating {
            return None;
        }

        current.is_navigating = true;
        Some(Self { state })
    }
}

impl Drop for NavigatingGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().is_navigating = false;
    }
}

pub struct Router {
    deps: RouterDeps,
    options: RouterOptions,
    config: RefCell<Option<Rc<ButtonConfiguration>>>,
    state: RefCell<NavigationState>,
    url_written: Cell<bool>,
}

impl Router {
    pub fn new(deps: RouterDeps, options: RouterOptions) -> Self {
        Self {
            deps,
            options,
            config: RefCell::new(None),
            state: RefCell::new(NavigationState::default()),
            url_written: Cell::new(false),
        }
    }

    pub fn set_config(&self, config: Rc<ButtonConfiguration>) {
        *self.config.borrow_mut() = Some(config);
    }

    pub fn config(&self) -> Option<Rc<ButtonConfiguration>> {
        self.config.borrow().clone()
    }

    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn is_navigating(&self) -> bool {
        self.state.borrow().is_navigating
    }

    pub fn parse_url(&self, input: impl Into<RouteInput>) -> Route {
        parse_route(&input.into(), self.config().as_deref())
    }

    pub fn normalize_url(&self, input: impl Into<RouteInput>) -> String {
        route::normalize_url(&input.into(), self.config().as_deref())
    }

    pub fn validate_url(&self, route: &Route) -> bool {
        self.config()
            .is_some_and(|config| route::validate_url(route, &config))
    }

    pub fn get_default_route(&self) -> Option<Route> {
        self.config()
            .and_then(|config| route::get_default_route(&config))
    }

    /// Navigate from whatever the address bar currently shows. The first
    /// history write of a session is always a replace.
    pub async fn start(&self) -> NavigateOutcome {
        let search = self.deps.history.search();
        self.navigate_to(search, NavigateOptions {
            replace: true,
            ..NavigateOptions::default()
        })
        .await
    }

    fn history_options() -> NavigateOptions {
        NavigateOptions {
            skip_url_update: true,
            maintain_scroll: true,
            from_history: true,
            ..NavigateOptions::default()
        }
    }

    /// Browser back/forward: the address already changed, so only state,
    /// controls and content follow it.
    ///
    /// When another navigation holds the lock this call is dropped, and the
    /// running navigation notices the moved address once its content arrives.
    pub async fn handle_popstate(&self) -> NavigateOutcome {
        let search = self.deps.history.search();

        if self.is_navigating() {
            tracing::debug!(%search, "popstate during navigation, deferring to it");
            return NavigateOutcome::Dropped;
        }

        if let Some(config) = self.config() {
            let requested = parse_route(&RouteInput::from(search.as_str()), Some(&config));
            if let Some(resolved) = resolve_route(&requested, &config) {
                self.deps
                    .chrome
                    .set_active(&resolved.route.main, resolved.route.sub.as_deref());
            }
        }

        self.navigate_to(search, Self::history_options()).await
    }

    pub async fn navigate_to(
        &self,
        input: impl Into<RouteInput>,
        options: NavigateOptions,
    ) -> NavigateOutcome {
        let Some(_guard) = NavigatingGuard::engage(&self.state) else {
            tracing::debug!("navigation already in progress, dropping request");
            return NavigateOutcome::Dropped;
        };

        let mut input = input.into();
        let mut options = options;

        loop {
            self.state.borrow_mut().last_scroll_position = self.deps.viewport.scroll_y();

            match self.run_navigation(&input, options).await {
                Ok(Pass::Rendered(route)) => return NavigateOutcome::Completed(route),
                Ok(Pass::Superseded(search)) => {
                    tracing::debug!(%search, "address moved while loading, following it");
                    input = RouteInput::from(search);
                    options = Self::history_options();
                }
                Err(e) => {
                    tracing::error!("navigation failed: {e}");
                    self.deps.notifier.show_error(&self.options.error_message);
                    self.deps.loading.force_hide();
                    return NavigateOutcome::Failed;
                }
            }
        }
    }

    async fn run_navigation(
        &self,
        input: &RouteInput,
        options: NavigateOptions,
    ) -> Result<Pass, NavigationError> {
        let config = self.config().ok_or(NavigationError::ConfigurationMissing)?;

        let requested = parse_route(input, Some(&config));
        let resolved = resolve_route(&requested, &config).ok_or(NavigationError::NoRoutes)?;

        if resolved.substituted {
            tracing::debug!(?requested, fallback = ?resolved.route, "unknown route, using default");
        }

        let route = resolved.route;

        {
            let mut state = self.state.borrow_mut();
            state.current_main_route = route.main.clone();
            state.current_sub_route = route.sub.clone().unwrap_or_default();
        }

        // controls react before anything is awaited
        self.deps.chrome.set_active(&route.main, route.sub.as_deref());

        if !options.skip_url_update {
            self.write_url(&route, &config, options.replace);
        }

        let expected_search = self.deps.history.search();

        let button = config
            .main_button(&route.main)
            .ok_or(NavigationError::NoRoutes)?;

        if button.has_sub_buttons() {
            self.deps
                .chrome
                .render_sub_buttons(button, route.sub.as_deref())?;
        } else {
            self.deps.chrome.clear_sub_buttons();
        }

        let main_resource = button.content_resource().map(str::to_owned);
        let sub_resource = route
            .sub
            .as_deref()
            .and_then(|sub| button.sub_button(sub))
            .and_then(|sub| sub.content_resource())
            .map(str::to_owned);

        self.deps.view.clear();
        self.deps.loading.show();

        let (main_items, sub_items) =
            join(self.load_slot(main_resource), self.load_slot(sub_resource)).await;

        self.deps.loading.hide();

        let search = self.deps.history.search();
        if search != expected_search {
            tracing::debug!(main = %route.main, "discarding content for a superseded navigation");
            return Ok(Pass::Superseded(search));
        }

        self.render_slots(main_items, sub_items);

        let (main, sub) = {
            let state = self.state.borrow();
            (state.current_main_route.clone(), state.current_sub_route.clone())
        };
        self.deps
            .chrome
            .set_active(&main, Some(sub.as_str()).filter(|sub| !sub.is_empty()));

        self.deps.bus.emit(HeaderEvent::RouteChanged { main, sub });

        if !options.maintain_scroll {
            self.deps.viewport.scroll_to_top();
        }

        tracing::info!(main = %route.main, sub = ?route.sub, from_history = options.from_history, "navigated");

        Ok(Pass::Rendered(route))
    }

    fn write_url(&self, route: &Route, config: &ButtonConfiguration, replace: bool) {
        let history = &self.deps.history;
        let canonical = canonical_query(route, config);
        let url = format!("{}{canonical}", history.pathname());

        if history.search() != canonical {
            let method = if replace || !self.url_written.get() {
                HistoryMethod::Replace
            } else {
                HistoryMethod::Push
            };

            match self.write_history(method, &url) {
                Ok(written) => self.deps.bus.emit(HeaderEvent::HistoryChanged {
                    method: written,
                    url: url.clone(),
                }),
                Err(e) => tracing::warn!("history not updated for {url}: {e}"),
            }
        }

        self.url_written.set(true);
        self.state.borrow_mut().previous_url = url.clone();

        self.deps.bus.emit(HeaderEvent::UrlChanged {
            url,
            main_route: route.main.clone(),
            sub_route: route.sub.clone().unwrap_or_default(),
        });
    }

    fn write_history(
        &self,
        method: HistoryMethod,
        url: &str,
    ) -> Result<HistoryMethod, hnav_utils::HistoryError> {
        match self.deps.history.write(method, url) {
            Ok(()) => Ok(method),
            Err(e) => {
                tracing::warn!("{method} failed, falling back to {}: {e}", method.other());
                self.deps
                    .history
                    .write(method.other(), url)
                    .map(|()| method.other())
            }
        }
    }

    async fn load_slot(
        &self,
        resource: Option<String>,
    ) -> Option<Result<Vec<ContentItem>, ContentError>> {
        let resource = resource?;
        let timeout = self.options.fetch_timeout;

        let request = self.deps.content.load(&resource);
        let deadline = self.deps.timer.sleep(timeout);

        match select(request, deadline).await {
            Either::Left((result, _)) => Some(result),
            Either::Right(((), _)) => Some(Err(ContentError::Timeout {
                resource,
                after_ms: timeout.as_millis() as u64,
            })),
        }
    }

    fn render_slots(
        &self,
        main: Option<Result<Vec<ContentItem>, ContentError>>,
        sub: Option<Result<Vec<ContentItem>, ContentError>>,
    ) {
        let mut items = Vec::new();
        let mut any_loaded = false;

        for slot in [main, sub].into_iter().flatten() {
            match slot {
                Ok(loaded) => {
                    any_loaded = true;
                    items.extend(loaded);
                }
                Err(e) => tracing::warn!("content slot failed: {e}"),
            }
        }

        if any_loaded {
            self.deps.view.render(&items);
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("state", &self.state.borrow())
            .field("options", &self.options)
            .field("url_written", &self.url_written.get())
            .finish()
    }
}

impl fmt::Debug for RouterDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterDeps").finish_non_exhaustive()
    }
}

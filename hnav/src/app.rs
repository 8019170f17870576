use std::fmt;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use hnav_components::{ButtonManager, ButtonSurface};
use hnav_lang::{
    BootOutcome, Clock, Enforcement, KeyValueStore, LanguageStore, LanguageSync,
    NavigationLanguageMap, NavigationMapRecorder, UrlEnforcer, localize_href,
};
use hnav_router::{
    ButtonConfiguration, ContentSource, ContentView, LoadingIndicator, NavigateOptions,
    NavigateOutcome, Notifier, RouteInput, Router, RouterDeps, Timer, Viewport,
};
use hnav_utils::{EventBus, HeaderEvent, HistoryApi, Lang};

use crate::error::AppError;
use crate::settings::HeaderSettings;

/// Drives futures started from synchronous callbacks such as button clicks.
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// The host environment the header runs in.
pub struct Platform {
    pub history: Rc<dyn HistoryApi>,
    pub local: Rc<dyn KeyValueStore>,
    pub session: Rc<dyn KeyValueStore>,
    pub clock: Rc<dyn Clock>,
    pub content: Rc<dyn ContentSource>,
    pub view: Rc<dyn ContentView>,
    pub loading: Rc<dyn LoadingIndicator>,
    pub notifier: Rc<dyn Notifier>,
    pub viewport: Rc<dyn Viewport>,
    pub timer: Rc<dyn Timer>,
    pub surface: Rc<dyn ButtonSurface>,
    pub spawner: Rc<dyn Spawner>,
    /// `navigator.language`, if the host has one.
    pub browser_language: Option<String>,
}

/// Every long-lived instance of the header, created once and passed around
/// explicitly.
pub struct HeaderApp {
    settings: HeaderSettings,
    bus: EventBus<HeaderEvent>,
    store: Rc<LanguageStore>,
    map: Rc<NavigationLanguageMap>,
    enforcer: Rc<UrlEnforcer>,
    sync: Rc<LanguageSync>,
    router: Rc<Router>,
    buttons: Rc<ButtonManager>,
}

impl HeaderApp {
    pub fn new(settings: HeaderSettings, platform: Platform) -> Rc<Self> {
        let bus = EventBus::new();
        let keys = settings.storage_keys.clone();

        let store = Rc::new(LanguageStore::new(
            platform.local.clone(),
            platform.clock.clone(),
            bus.clone(),
            keys.clone(),
        ));
        let map = Rc::new(NavigationLanguageMap::new(
            platform.session.clone(),
            platform.clock.clone(),
            keys.navigation_map,
        ));
        NavigationMapRecorder::attach(map.clone(), &bus);

        let browser_lang = settings.browser_language(platform.browser_language.as_deref());
        let enforcer = Rc::new(UrlEnforcer::new(
            platform.history.clone(),
            store.clone(),
            map.clone(),
            platform.session,
            platform.clock,
            bus.clone(),
            settings.enforcer_options(browser_lang),
        ));
        let sync = LanguageSync::attach(store.clone(), enforcer.clone(), bus.clone());

        let buttons = Rc::new(ButtonManager::new(platform.surface, enforcer.decide().lang));
        let router = Rc::new(Router::new(
            RouterDeps {
                history: platform.history,
                content: platform.content,
                view: platform.view,
                loading: platform.loading,
                notifier: platform.notifier,
                viewport: platform.viewport,
                timer: platform.timer,
                chrome: buttons.clone(),
                bus: bus.clone(),
            },
            settings.router_options(),
        ));

        {
            let router = Rc::downgrade(&router);
            let spawner = platform.spawner;
            buttons.set_click_handler(Rc::new(move |input: RouteInput| {
                let Some(router) = router.upgrade() else {
                    return;
                };

                spawner.spawn(Box::pin(async move {
                    router.navigate_to(input, NavigateOptions::default()).await;
                }));
            }));
        }

        {
            let buttons = Rc::downgrade(&buttons);
            bus.subscribe(move |event: &HeaderEvent| {
                if let HeaderEvent::LanguageChanged { language, .. } = event
                    && let Some(buttons) = buttons.upgrade()
                    && let Err(e) = buttons.update_buttons_language(*language)
                {
                    tracing::warn!("buttons not relabelled: {e}");
                }
            });
        }

        Rc::new(Self {
            settings,
            bus,
            store,
            map,
            enforcer,
            sync,
            router,
            buttons,
        })
    }

    pub fn settings(&self) -> &HeaderSettings {
        &self.settings
    }

    pub fn bus(&self) -> &EventBus<HeaderEvent> {
        &self.bus
    }

    pub fn store(&self) -> &Rc<LanguageStore> {
        &self.store
    }

    pub fn navigation_map(&self) -> &Rc<NavigationLanguageMap> {
        &self.map
    }

    pub fn router(&self) -> &Rc<Router> {
        &self.router
    }

    pub fn buttons(&self) -> &Rc<ButtonManager> {
        &self.buttons
    }

    /// The language the page should be showing right now.
    pub fn current_language(&self) -> Lang {
        self.enforcer.decide().lang
    }

    /// First evaluation, before anything is rendered. A `Redirected` outcome
    /// means the page is being replaced and nothing else should run.
    pub fn boot(&self) -> BootOutcome {
        let outcome = self.enforcer.on_boot();
        tracing::debug!(?outcome, "boot");
        outcome
    }

    /// Hand one configuration snapshot to both the router and the buttons.
    pub fn install_config(&self, config: ButtonConfiguration) -> Result<(), AppError> {
        let config = Rc::new(config);
        self.router.set_config(config.clone());
        self.buttons.set_config(config);
        self.buttons.render_buttons()?;

        Ok(())
    }

    pub fn install_config_json(&self, json: &str) -> Result<(), AppError> {
        self.install_config(ButtonConfiguration::from_json(json)?)
    }

    /// Navigate to whatever the address bar shows, replacing the entry.
    pub async fn start(&self) -> NavigateOutcome {
        self.router.start().await
    }

    pub async fn navigate(&self, input: impl Into<RouteInput>) -> NavigateOutcome {
        self.router
            .navigate_to(input, NavigateOptions::default())
            .await
    }

    /// Back/forward: fix the language prefix first, then follow the query.
    pub async fn handle_popstate(&self) -> NavigateOutcome {
        self.enforcer.on_navigation_event();
        self.router.handle_popstate().await
    }

    /// A `storage` event from another tab. `key` is `None` for `clear()`.
    pub fn handle_storage_event(&self, key: Option<&str>) -> Option<Enforcement> {
        self.sync.handle_storage_event(key)
    }

    /// The language toggle: persist the choice, then rewrite the address in place.
    ///
    /// Storage failures are logged; the choice still applies to this tab.
    pub fn switch_language(&self, lang: Lang) -> Result<Enforcement, AppError> {
        if !self.settings.supports(lang) {
            return Err(AppError::UnsupportedLanguage(lang));
        }

        if let Err(e) = self.store.set(lang, "user-click") {
            tracing::warn!("language choice kept in memory only: {e}");
        }

        Ok(self.enforcer.on_navigation_event())
    }

    /// `href` rewritten for the current language, or `None` to leave it alone.
    pub fn localize(&self, href: &str, origin: Option<&str>) -> Option<String> {
        localize_href(href, self.current_language(), origin)
    }
}

impl fmt::Debug for HeaderApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderApp")
            .field("settings", &self.settings)
            .field("router", &self.router)
            .field("buttons", &self.buttons)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("browser_language", &self.browser_language)
            .finish_non_exhaustive()
    }
}

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use hnav_router::{
    ButtonConfiguration, ChromeError, MainButton, NavigationChrome, Route, RouteInput, SubButton,
};
use hnav_utils::Lang;

/// What a single rendered button shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub route_id: String,
    pub label: String,
    /// Canonical query string the button navigates to.
    pub href: String,
    pub active: bool,
}

pub type ClickHandler = Rc<dyn Fn(RouteInput)>;

/// Where buttons are drawn. Each render call replaces what the previous one drew.
pub trait ButtonSurface {
    fn render_main(&self, buttons: &[ButtonView], on_click: ClickHandler) -> Result<(), ChromeError>;

    fn render_sub(
        &self,
        parent: &str,
        buttons: &[ButtonView],
        on_click: ClickHandler,
    ) -> Result<(), ChromeError>;

    fn clear_sub(&self);

    fn mark_active(&self, main: &str, sub: Option<&str>);
}

pub fn main_button_views(config: &ButtonConfiguration, lang: Lang, active: Option<&str>) -> Vec<ButtonView> {
    config
        .main_buttons
        .iter()
        .filter_map(|button| {
            let route_id = button.route_id()?;
            let label = button.labels.get(lang)?;
            let href = Route::new(route_id.clone()).to_query(button.has_sub_buttons());

            Some(ButtonView {
                active: active == Some(route_id.as_str()),
                route_id,
                label: label.to_owned(),
                href,
            })
        })
        .collect()
}

/// One view per sub-button labelled in `lang`. The entry matching `current`
/// is active, else the one marked default, else none.
pub fn sub_button_views(
    parent: &str,
    sub_buttons: &[SubButton],
    lang: Lang,
    current: Option<&str>,
) -> Vec<ButtonView> {
    let mut views: Vec<(ButtonView, bool)> = sub_buttons
        .iter()
        .filter_map(|button| {
            let route_id = button.route_id()?;
            let label = button.labels.get(lang)?;
            let href = Route::with_sub(parent, route_id.clone()).to_query(true);

            Some((
                ButtonView {
                    route_id,
                    label: label.to_owned(),
                    href,
                    active: false,
                },
                button.is_default,
            ))
        })
        .collect();

    let active = current
        .and_then(|current| views.iter().position(|(view, _)| view.route_id == current))
        .or_else(|| views.iter().position(|(_, is_default)| *is_default));

    if let Some(index) = active {
        views[index].0.active = true;
    }

    views.into_iter().map(|(view, _)| view).collect()
}

/// Renders the configured buttons and forwards clicks to the router.
pub struct ButtonManager {
    surface: Rc<dyn ButtonSurface>,
    config: RefCell<Option<Rc<ButtonConfiguration>>>,
    lang: Cell<Lang>,
    on_click: RefCell<ClickHandler>,
    active: RefCell<(String, Option<String>)>,
    sub_parent: RefCell<Option<String>>,
}

impl ButtonManager {
    pub fn new(surface: Rc<dyn ButtonSurface>, lang: Lang) -> Self {
        Self {
            surface,
            config: RefCell::new(None),
            lang: Cell::new(lang),
            on_click: RefCell::new(Rc::new(|_| {})),
            active: RefCell::new((String::new(), None)),
            sub_parent: RefCell::new(None),
        }
    }

    pub fn set_click_handler(&self, handler: ClickHandler) {
        *self.on_click.borrow_mut() = handler;
    }

    pub fn set_config(&self, config: Rc<ButtonConfiguration>) {
        *self.config.borrow_mut() = Some(config);
    }

    pub fn lang(&self) -> Lang {
        self.lang.get()
    }

    pub fn render_buttons(&self) -> Result<Vec<ButtonView>, ChromeError> {
        let Some(config) = self.config.borrow().clone() else {
            return Ok(Vec::new());
        };

        let active = self.active.borrow().0.clone();
        let views = main_button_views(&config, self.lang.get(), Some(active.as_str()));
        self.surface.render_main(&views, self.on_click.borrow().clone())?;

        Ok(views)
    }

    pub fn render_sub_buttons(
        &self,
        parent: &MainButton,
        current: Option<&str>,
    ) -> Result<Vec<ButtonView>, ChromeError> {
        let parent_id = parent
            .route_id()
            .ok_or_else(|| ChromeError("sub-buttons belong to a button without a route".to_owned()))?;

        let views = sub_button_views(&parent_id, &parent.sub_buttons, self.lang.get(), current);
        self.surface
            .render_sub(&parent_id, &views, self.on_click.borrow().clone())?;

        tracing::debug!(parent = %parent_id, count = views.len(), "sub-buttons rendered");
        *self.sub_parent.borrow_mut() = Some(parent_id);

        Ok(views)
    }

    /// Redraw every button with captions in `lang`, keeping the active state.
    pub fn update_buttons_language(&self, lang: Lang) -> Result<(), ChromeError> {
        self.lang.set(lang);
        self.render_buttons()?;

        let config = self.config.borrow().clone();
        let parent = self.sub_parent.borrow().clone();

        if let (Some(config), Some(parent)) = (config, parent)
            && let Some(button) = config.main_button(&parent)
        {
            let current = self.active.borrow().1.clone();
            self.render_sub_buttons(button, current.as_deref())?;
        }

        let (main, sub) = self.active.borrow().clone();
        self.surface.mark_active(&main, sub.as_deref());

        Ok(())
    }
}

impl NavigationChrome for ButtonManager {
    fn set_active(&self, main: &str, sub: Option<&str>) {
        *self.active.borrow_mut() = (main.to_owned(), sub.map(str::to_owned));
        self.surface.mark_active(main, sub);
    }

    fn render_sub_buttons(&self, parent: &MainButton, active: Option<&str>) -> Result<(), ChromeError> {
        ButtonManager::render_sub_buttons(self, parent, active).map(|_| ())
    }

    fn clear_sub_buttons(&self) {
        *self.sub_parent.borrow_mut() = None;
        self.surface.clear_sub();
    }
}

impl fmt::Debug for ButtonManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonManager")
            .field("lang", &self.lang.get())
            .field("active", &self.active.borrow())
            .field("sub_parent", &self.sub_parent.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(url: &str, en: Option<&str>, th: Option<&str>, is_default: bool) -> SubButton {
        SubButton {
            url: Some(url.to_owned()),
            is_default,
            labels: hnav_router::Labels {
                en: en.map(str::to_owned),
                th: th.map(str::to_owned),
            },
            ..SubButton::default()
        }
    }

    fn news() -> MainButton {
        MainButton {
            url: Some("news".to_owned()),
            labels: hnav_router::Labels {
                en: Some("News".to_owned()),
                th: Some("ข่าว".to_owned()),
            },
            sub_buttons: vec![
                sub("local", Some("Local"), None, false),
                sub("world", Some("World"), Some("โลก"), true),
                sub("sport", Some("Sport"), Some("กีฬา"), false),
            ],
            ..MainButton::default()
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        subs: RefCell<Vec<(String, Vec<ButtonView>)>>,
        mains: RefCell<Vec<Vec<ButtonView>>>,
        marks: RefCell<Vec<(String, Option<String>)>>,
        handler: RefCell<Option<ClickHandler>>,
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

        fn clear_sub(&self) {}

        fn mark_active(&self, main: &str, sub: Option<&str>) {
            self.marks
                .borrow_mut()
                .push((main.to_owned(), sub.map(str::to_owned)));
        }
    }

    fn active_ids(views: &[ButtonView]) -> Vec<&str> {
        views
            .iter()
            .filter(|view| view.active)
            .map(|view| view.route_id.as_str())
            .collect()
    }

    #[test]
    fn skips_entries_without_label_in_language() {
        let button = news();
        let views = sub_button_views("news", &button.sub_buttons, Lang::Th, None);

        let ids: Vec<&str> = views.iter().map(|view| view.route_id.as_str()).collect();
        assert_eq!(ids, vec!["world", "sport"]);
        assert_eq!(views[0].label, "โลก");
        assert_eq!(views[1].href, "?type=news__&page=sport");
    }

    #[test]
    fn active_is_current_then_default_then_none() {
        let button = news();

        let views = sub_button_views("news", &button.sub_buttons, Lang::En, Some("sport"));
        assert_eq!(active_ids(&views), vec!["sport"]);

        let views = sub_button_views("news", &button.sub_buttons, Lang::En, Some("gone"));
        assert_eq!(active_ids(&views), vec!["world"]);

        let mut no_default = button.sub_buttons.clone();
        no_default[1].is_default = false;
        let views = sub_button_views("news", &no_default, Lang::En, None);
        assert!(active_ids(&views).is_empty());
    }

    #[test]
    fn rendering_twice_replaces_content() {
        let surface = Rc::new(RecordingSurface::default());
        let manager = ButtonManager::new(surface.clone(), Lang::En);
        let button = news();

        manager.render_sub_buttons(&button, Some("local")).unwrap();
        let second = manager.render_sub_buttons(&button, Some("local")).unwrap();

        assert_eq!(surface.subs.borrow().len(), 2);
        assert_eq!(surface.subs.borrow()[0].1, second);
        assert_eq!(active_ids(&second), vec!["local"]);
    }

    #[test]
    fn language_update_redraws_with_active_state() {
        let surface = Rc::new(RecordingSurface::default());
        let manager = ButtonManager::new(surface.clone(), Lang::En);
        manager.set_config(Rc::new(ButtonConfiguration {
            main_buttons: vec![news()],
        }));

        NavigationChrome::set_active(&manager, "news", Some("sport"));
        NavigationChrome::render_sub_buttons(&manager, &news(), Some("sport")).unwrap();
        manager.update_buttons_language(Lang::Th).unwrap();

        let mains = surface.mains.borrow();
        assert_eq!(mains.last().map(|views| views[0].label.as_str()), Some("ข่าว"));
        assert_eq!(active_ids(mains.last().unwrap()), vec!["news"]);

        let subs = surface.subs.borrow();
        let (_, last) = subs.last().unwrap();
        assert_eq!(active_ids(last), vec!["sport"]);
        assert_eq!(last.len(), 2);
        assert_eq!(
            surface.marks.borrow().last(),
            Some(&("news".to_owned(), Some("sport".to_owned())))
        );
    }

    #[test]
    fn clicks_reach_the_installed_handler() {
        let surface = Rc::new(RecordingSurface::default());
        let manager = ButtonManager::new(surface.clone(), Lang::En);
        manager.set_config(Rc::new(ButtonConfiguration {
            main_buttons: vec![news()],
        }));

        let clicked = Rc::new(RefCell::new(Vec::new()));
        {
            let clicked = clicked.clone();
            manager.set_click_handler(Rc::new(move |input: RouteInput| clicked.borrow_mut().push(input)));
        }

        let views = manager.render_buttons().unwrap();
        let handler = surface.handler.borrow().clone().unwrap();
        handler(RouteInput::from(views[0].href.as_str()));

        assert_eq!(*clicked.borrow(), vec![RouteInput::from("?type=news__")]);
    }
}

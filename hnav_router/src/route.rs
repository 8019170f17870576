// Canonical URL form: `?type=<main>[__]&page=<sub>`.
//
// The `__` suffix on `type` says the main route owns a sub-route menu. Legacy
// `main-sub` and bare `main` strings are accepted on input and never produced.

use hnav_utils::query::{build_query, parse_query, split_path_query};

use crate::config::ButtonConfiguration;

pub const TYPE_PARAM: &str = "type";
pub const PAGE_PARAM: &str = "page";
pub const SUB_MENU_MARKER: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Route {
    pub main: String,
    pub sub: Option<String>,
}

impl Route {
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            sub: None,
        }
    }

    pub fn with_sub(main: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            sub: Some(sub.into()).filter(|sub: &String| !sub.is_empty()),
        }
    }

    /// Serialize to the canonical query string.
    pub fn to_query(&self, has_sub_menu: bool) -> String {
        let main = if has_sub_menu {
            format!("{}{SUB_MENU_MARKER}", self.main)
        } else {
            self.main.clone()
        };

        match self.sub.as_deref() {
            Some(sub) => build_query(&[(TYPE_PARAM, main.as_str()), (PAGE_PARAM, sub)]),
            None => build_query(&[(TYPE_PARAM, main.as_str())]),
        }
    }
}

/// Anything `navigate_to` accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteInput {
    /// The object form, `{ type, page }`.
    Parts { main: String, sub: Option<String> },
    /// A canonical query string, a URL carrying one, or a legacy route string.
    Text(String),
}

impl From<&str> for RouteInput {
    fn from(text: &str) -> Self {
        RouteInput::Text(text.to_owned())
    }
}

impl From<String> for RouteInput {
    fn from(text: String) -> Self {
        RouteInput::Text(text)
    }
}

impl From<Route> for RouteInput {
    fn from(route: Route) -> Self {
        RouteInput::Parts {
            main: route.main,
            sub: route.sub,
        }
    }
}

impl From<(&str, &str)> for RouteInput {
    fn from((main, sub): (&str, &str)) -> Self {
        Route::with_sub(main, sub).into()
    }
}

fn strip_marker(main: &str) -> &str {
    main.strip_suffix(SUB_MENU_MARKER).unwrap_or(main)
}

fn from_parts(main: &str, sub: Option<&str>) -> Route {
    Route {
        main: strip_marker(main.trim()).to_owned(),
        sub: sub.map(str::trim).filter(|sub| !sub.is_empty()).map(str::to_owned),
    }
}

fn query_form(text: &str) -> Option<&str> {
    let (_, query) = split_path_query(text);

    if !query.is_empty() {
        return Some(query);
    }

    text.contains('=').then_some(text)
}

fn param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_query_form(query: &str) -> Route {
    let pairs = parse_query(query);

    from_parts(
        param(&pairs, TYPE_PARAM).unwrap_or_default(),
        param(&pairs, PAGE_PARAM),
    )
}

fn legacy_text(text: &str) -> &str {
    let text = text.trim();
    let (path, _) = split_path_query(text);
    path.trim_matches('/')
}

/// Parse without a configuration. Legacy strings split at the first `-`.
pub fn parse_url(input: &str) -> Route {
    if let Some(query) = query_form(input) {
        return parse_query_form(query);
    }

    let legacy = legacy_text(input);
    match legacy.split_once('-') {
        Some((main, sub)) => from_parts(main, Some(sub)),
        None => from_parts(legacy, None),
    }
}

/// Parse with the configuration at hand, so legacy strings whose main route
/// itself contains `-` are split where the configuration says.
pub fn parse_route(input: &RouteInput, config: Option<&ButtonConfiguration>) -> Route {
    let text = match input {
        RouteInput::Parts { main, sub } => return from_parts(main, sub.as_deref()),
        RouteInput::Text(text) => text,
    };

    let Some(config) = config else {
        return parse_url(text);
    };

    if query_form(text).is_some() {
        return parse_url(text);
    }

    let legacy = legacy_text(text);

    if config.main_button(legacy).is_some() {
        return from_parts(legacy, None);
    }

    // longest configured main route first
    let mut fallback = None;
    for (index, _) in legacy.rmatch_indices('-') {
        let (main, sub) = (&legacy[..index], &legacy[index + 1..]);

        if let Some(button) = config.main_button(main) {
            if button.sub_button(sub).is_some() {
                return from_parts(main, Some(sub));
            }
            fallback.get_or_insert_with(|| from_parts(main, Some(sub)));
        }
    }

    fallback.unwrap_or_else(|| parse_url(text))
}

/// Canonical query string for `input`.
///
/// With a configuration the `__` marker follows the configured button; without
/// one it is written whenever a sub-route is present.
pub fn normalize_url(input: &RouteInput, config: Option<&ButtonConfiguration>) -> String {
    let route = parse_route(input, config);
    let has_sub_menu = config
        .and_then(|config| config.main_button(&route.main))
        .map(|button| button.has_sub_buttons())
        .unwrap_or(route.sub.is_some());

    route.to_query(has_sub_menu)
}

/// Whether `route` names a configured main button and, when a sub-route is
/// given, one of that button's sub-buttons.
pub fn validate_url(route: &Route, config: &ButtonConfiguration) -> bool {
    let Some(button) = config.main_button(&route.main) else {
        return false;
    };

    match route.sub.as_deref() {
        Some(sub) => button.sub_button(sub).is_some(),
        None => true,
    }
}

pub fn get_default_route(config: &ButtonConfiguration) -> Option<Route> {
    let button = config.default_main_button()?;
    let main = button.route_id()?;
    let sub = button.default_sub_button().and_then(|sub| sub.route_id());

    Some(Route { main, sub })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub route: Route,
    /// The requested route was invalid and the default was used instead.
    pub substituted: bool,
}

/// The route a navigation to `requested` lands on.
///
/// A valid main route without a sub-route gets its default sub-route; an
/// invalid request becomes the default route. `None` only for a configuration
/// without any routable button.
pub fn resolve_route(requested: &Route, config: &ButtonConfiguration) -> Option<Resolved> {
    if !validate_url(requested, config) {
        return get_default_route(config).map(|route| Resolved {
            route,
            substituted: true,
        });
    }

    let mut route = requested.clone();
    if route.sub.is_none() {
        route.sub = config
            .main_button(&route.main)
            .and_then(|button| button.default_sub_button())
            .and_then(|sub| sub.route_id());
    }

    Some(Resolved {
        route,
        substituted: false,
    })
}

pub fn canonical_query(route: &Route, config: &ButtonConfiguration) -> String {
    normalize_url(&route.clone().into(), Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MainButton, SubButton};

    fn sub(url: &str, is_default: bool) -> SubButton {
        SubButton {
            url: Some(url.to_owned()),
            is_default,
            ..SubButton::default()
        }
    }

    fn config() -> ButtonConfiguration {
        ButtonConfiguration {
            main_buttons: vec![
                MainButton {
                    url: Some("a".to_owned()),
                    ..MainButton::default()
                },
                MainButton {
                    url: Some("b".to_owned()),
                    sub_buttons: vec![sub("b1", true), sub("b2", false)],
                    ..MainButton::default()
                },
                MainButton {
                    url: Some("about-us".to_owned()),
                    sub_buttons: vec![sub("team", false)],
                    ..MainButton::default()
                },
            ],
        }
    }

    #[test]
    fn parses_every_input_shape() {
        assert_eq!(parse_url("?type=b__&page=b2"), Route::with_sub("b", "b2"));
        assert_eq!(parse_url("type=b__"), Route::new("b"));
        assert_eq!(parse_url("/th/news?type=a"), Route::new("a"));
        assert_eq!(parse_url("b-b2"), Route::with_sub("b", "b2"));
        assert_eq!(parse_url("a"), Route::new("a"));
        assert_eq!(parse_url(""), Route::default());
        assert_eq!(parse_url("?type=b__&page="), Route::new("b"));
    }

    #[test]
    fn configured_hyphenated_main_routes_win() {
        let config = config();

        assert_eq!(
            parse_route(&"about-us".into(), Some(&config)),
            Route::new("about-us")
        );
        assert_eq!(
            parse_route(&"about-us-team".into(), Some(&config)),
            Route::with_sub("about-us", "team")
        );
        assert_eq!(
            parse_route(&"about-us-team".into(), None),
            Route::with_sub("about", "us-team")
        );
    }

    #[test]
    fn normalizes_to_canonical_form() {
        let config = config();

        assert_eq!(normalize_url(&"b-b2".into(), Some(&config)), "?type=b__&page=b2");
        assert_eq!(normalize_url(&"b".into(), Some(&config)), "?type=b__");
        assert_eq!(normalize_url(&"a".into(), Some(&config)), "?type=a");
        assert_eq!(normalize_url(&("x", "y").into(), None), "?type=x__&page=y");
        assert_eq!(normalize_url(&"?type=a&page=".into(), None), "?type=a");
    }

    #[test]
    fn validates_against_configuration() {
        let config = config();

        assert!(validate_url(&Route::new("a"), &config));
        assert!(validate_url(&Route::with_sub("b", "b2"), &config));
        assert!(!validate_url(&Route::with_sub("b", "zz"), &config));
        assert!(!validate_url(&Route::with_sub("a", "b1"), &config));
        assert!(!validate_url(&Route::new("unknown"), &config));
    }

    #[test]
    fn resolves_defaults_and_substitutions() {
        let config = config();

        let resolved = resolve_route(&Route::new("b"), &config).unwrap();
        assert_eq!(resolved.route, Route::with_sub("b", "b1"));
        assert!(!resolved.substituted);

        let resolved = resolve_route(&Route::new("unknown"), &config).unwrap();
        assert_eq!(resolved.route, Route::new("a"));
        assert!(resolved.substituted);

        assert_eq!(resolve_route(&Route::new("a"), &ButtonConfiguration::default()), None);
    }
}

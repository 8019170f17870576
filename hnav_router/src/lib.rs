#![allow(missing_docs)]

//! Query-string routing for the header navigation: the button configuration,
//! canonical URL handling and the `Router` state machine.

pub mod collaborators;
pub mod config;
pub mod route;
mod router;

pub use collaborators::{
    ChromeError, ContentError, ContentItem, ContentSource, ContentView, LoadingIndicator,
    NavigationChrome, Notifier, Timer, Viewport,
};
pub use config::{ButtonConfiguration, ConfigError, Labels, MainButton, SubButton};
pub use route::{
    Resolved, Route, RouteInput, canonical_query, get_default_route, normalize_url, parse_route,
    parse_url, resolve_route, validate_url,
};
pub use router::{
    NavigateOptions, NavigateOutcome, NavigationError, NavigationState, Router, RouterDeps,
    RouterOptions,
};

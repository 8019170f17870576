//! Seams between the router and the page around it.
//!
//! The browser implementations live in the `hnav` crate; tests substitute
//! in-memory ones.

use std::time::Duration;

use futures_util::future::LocalBoxFuture;

use crate::config::MainButton;

/// One renderable entry of a content resource.
pub type ContentItem = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("request for `{resource}` failed: {reason}")]
    Network { resource: String, reason: String },
    #[error("request for `{resource}` returned status {status}")]
    Status { resource: String, status: u16 },
    #[error("request for `{resource}` timed out after {after_ms} ms")]
    Timeout { resource: String, after_ms: u64 },
    #[error("`{resource}` is not a list of items: {reason}")]
    Malformed { resource: String, reason: String },
}

pub trait ContentSource {
    fn load(&self, resource: &str) -> LocalBoxFuture<'static, Result<Vec<ContentItem>, ContentError>>;
}

pub trait ContentView {
    fn clear(&self);

    fn render(&self, items: &[ContentItem]);
}

pub trait LoadingIndicator {
    fn show(&self);

    fn hide(&self);

    /// Hide regardless of how many times `show` was called.
    fn force_hide(&self) {
        self.hide();
    }
}

pub trait Notifier {
    /// A transient, dismissible error message.
    fn show_error(&self, message: &str);
}

pub trait Viewport {
    fn scroll_y(&self) -> f64;

    fn scroll_to_top(&self);
}

pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("navigation controls could not be updated: {0}")]
pub struct ChromeError(pub String);

/// The navigation buttons, as seen from the router.
pub trait NavigationChrome {
    fn set_active(&self, main: &str, sub: Option<&str>);

    fn render_sub_buttons(&self, parent: &MainButton, active: Option<&str>) -> Result<(), ChromeError>;

    fn clear_sub_buttons(&self);
}

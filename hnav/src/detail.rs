use hnav_utils::HeaderEvent;
use serde_json::{Value, json};

/// The `detail` payload a page script sees on the DOM event named
/// `event.name()`. Field names follow the page's camelCase conventions.
pub fn event_detail(event: &HeaderEvent) -> Value {
    match event {
        HeaderEvent::LanguageChanged { language, source } => json!({
            "language": language.code(),
            "source": source,
        }),
        HeaderEvent::HistoryChanged { method, url } => json!({
            "method": method.to_string(),
            "url": url,
        }),
        HeaderEvent::UrlChanged {
            url,
            main_route,
            sub_route,
        } => json!({
            "url": url,
            "mainRoute": main_route,
            "subRoute": sub_route,
        }),
        HeaderEvent::RouteChanged { main, sub } => json!({
            "main": main,
            "sub": sub,
        }),
    }
}

// Language prefixes on URL paths.
//
// Every function here is total and side-effect free: a path that cannot carry a
// prefix is handed back untouched instead of producing an error.

use crate::lang::Lang;

/// Path prefixes that must never receive a language segment.
pub const NON_PREFIXABLE: &[&str] = &[
    "/assets/",
    "/api/",
    "/static/",
    "/favicon.ico",
    "/robots.txt",
    "/sitemap.xml",
    "/manifest.json",
    "/service-worker.js",
    "/sw.js",
];

/// The language carried by the first path segment, if any.
///
/// `/en`, `/en/` and `/en/about` all yield `en`; `/english` does not.
pub fn language_of(path: &str) -> Option<Lang> {
    let rest = path.strip_prefix('/')?;
    let segment = rest.split(['/', '?', '#']).next()?;
    segment.parse().ok()
}

pub fn strip_prefix(path: &str) -> String {
    if path.is_empty() {
        return String::from("/");
    }

    let Some(lang) = language_of(path) else {
        return path.to_owned();
    };

    let rest = &path[1 + lang.code().len()..];

    if rest.is_empty() {
        String::from("/")
    } else if rest.starts_with('/') {
        rest.to_owned()
    } else {
        // query or fragment directly after the language segment
        format!("/{rest}")
    }
}

pub fn is_prefixable(path: &str) -> bool {
    if !path.starts_with('/') || path.starts_with("//") {
        return false;
    }

    let bare = strip_prefix(path);
    !NON_PREFIXABLE.iter().any(|denied| {
        bare.starts_with(denied) || (denied.ends_with('/') && bare == denied.trim_end_matches('/'))
    })
}

/// Apply `lang` as the first path segment, replacing any existing prefix.
pub fn with_prefix(path: &str, lang: Lang) -> String {
    let path = if path.is_empty() { "/" } else { path };

    if !is_prefixable(path) {
        return path.to_owned();
    }

    // `/` becomes `/en/`, so the root keeps its trailing slash
    format!("/{}{}", lang.code(), strip_prefix(path))
}

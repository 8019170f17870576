use hnav_utils::{Lang, is_prefixable, with_prefix};

const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:", "blob:"];

/// Rewrite an anchor target so it carries `lang`.
///
/// Returns `None` when the link must be left alone: fragments, other schemes,
/// other origins, relative links and non-prefixable paths, or when the href
/// already has the right prefix.
pub fn localize_href(href: &str, lang: Lang, origin: Option<&str>) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || SKIPPED_SCHEMES.iter().any(|scheme| href.starts_with(scheme))
    {
        return None;
    }

    if let Some(origin) = origin.filter(|origin| !origin.is_empty())
        && let Some(rest) = href.strip_prefix(origin)
        && (rest.is_empty() || rest.starts_with('/'))
    {
        let rest = if rest.is_empty() { "/" } else { rest };
        return localize_path(rest, lang).map(|path| format!("{origin}{path}"));
    }

    if href.starts_with('/') {
        return localize_path(href, lang);
    }

    None
}

fn localize_path(href: &str, lang: Lang) -> Option<String> {
    let split = href.find(['?', '#']).unwrap_or(href.len());
    let (path, tail) = href.split_at(split);

    if !is_prefixable(path) {
        return None;
    }

    let localized = format!("{}{tail}", with_prefix(path, lang));
    (localized != href).then_some(localized)
}

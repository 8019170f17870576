//! Query-string helpers shared by the router and the language layer.

/// Split `url` into its path and query parts, dropping any fragment.
///
/// The query part keeps its leading `?` so the pieces concatenate back.
pub fn split_path_query(url: &str) -> (&str, &str) {
    let url = url.split('#').next().unwrap_or_default();

    match url.find('?') {
        Some(index) => (&url[..index], &url[index..]),
        None => (url, ""),
    }
}

/// Decode a query string (with or without the leading `?`) into ordered pairs.
///
/// Malformed input decodes to no pairs rather than failing.
pub fn parse_query(search: &str) -> Vec<(String, String)> {
    let search = search.trim_start_matches('?');

    if search.is_empty() {
        return Vec::new();
    }

    serde_urlencoded::from_str(search).unwrap_or_default()
}

/// Encode pairs into `?k=v&...`, or an empty string when there are none.
pub fn build_query(pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    match serde_urlencoded::to_string(pairs) {
        Ok(encoded) => format!("?{encoded}"),
        Err(_) => String::new(),
    }
}

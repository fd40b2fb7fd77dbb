//! URL and path naming utilities.
//!
//! Turns package names and page URLs into names that are safe to use as
//! directory and file names inside the cache root.

use url::Url;

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// `@types/node` becomes `_types_node`.
#[must_use]
pub fn sanitize_package_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derive a stable `.html` file name from a normalized URL
///
/// Host and path are flattened into one name, followed by a short xxh3 hash
/// of the full URL so URLs that flatten alike stay distinct:
/// `https://react.dev/learn` becomes `react.dev_learn-<hash>.html`.
#[must_use]
pub fn url_to_filename(url: &str) -> String {
    let stem = match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("page");
            let path = parsed.path().trim_matches('/');
            if path.is_empty() {
                host.to_string()
            } else {
                format!("{host}_{path}")
            }
        }
        Err(_) => url.to_string(),
    };

    let mut name = sanitize_package_name(&stem);
    // Collapse runs left behind by separators
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    let name = name.trim_matches('_');
    let name = name.strip_suffix(".html").unwrap_or(name);
    let name = if name.is_empty() { "page" } else { name };

    let hash = xxhash_rust::xxh3::xxh3_64(url.as_bytes()) as u32;
    format!("{name}-{hash:08x}.html")
}

/// Check if a URL is an absolute http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_scoped_names() {
        assert_eq!(sanitize_package_name("@types/node"), "_types_node");
        assert_eq!(sanitize_package_name("lodash.merge"), "lodash.merge");
        assert_eq!(sanitize_package_name("a b:c"), "a_b_c");
    }

    #[test]
    fn filenames_from_urls() {
        let stem = |url: &str| {
            let name = url_to_filename(url);
            assert!(name.ends_with(".html"), "{name}");
            // Drop "-xxxxxxxx.html"
            name[..name.len() - ".html".len() - 9].to_string()
        };
        assert_eq!(stem("https://react.dev"), "react.dev");
        assert_eq!(stem("https://react.dev/reference/react"), "react.dev_reference_react");
        assert_eq!(stem("https://docs.rs/guide/intro.html"), "docs.rs_guide_intro");
        assert_eq!(
            url_to_filename("https://react.dev/learn"),
            url_to_filename("https://react.dev/learn")
        );
    }

    #[test]
    fn urls_that_flatten_alike_get_distinct_names() {
        assert_ne!(
            url_to_filename("https://a.dev/docs/a_b"),
            url_to_filename("https://a.dev/docs/a/b")
        );
        assert_ne!(
            url_to_filename("https://a.dev/docs/a.html"),
            url_to_filename("https://a.dev/docs/a")
        );
    }

    #[test]
    fn only_http_urls_are_valid() {
        assert!(is_valid_url("https://example.com/docs"));
        assert!(!is_valid_url("mailto:me@example.com"));
        assert!(!is_valid_url("/relative"));
        assert!(!is_valid_url(""));
    }
}

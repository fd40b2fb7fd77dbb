//! Documentation URL heuristics

use url::Url;

/// Path fragments that mark a page as documentation
pub const DOCUMENTATION_PATTERNS: [&str; 8] = [
    "docs",
    "guide",
    "api",
    "tutorial",
    "reference",
    "manual",
    "readme",
    "getting-started",
];

/// Whether any path segment of `url` matches a documentation pattern.
///
/// Matching is case-insensitive and by substring, so `/API-Reference/` and
/// `/README.md` both count. Unparseable input is never documentation.
#[must_use]
pub fn is_documentation_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let Some(segments) = parsed.path_segments() else {
        return false;
    };

    segments
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .any(|segment| DOCUMENTATION_PATTERNS.iter().any(|pattern| segment.contains(pattern)))
}

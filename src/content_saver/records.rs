//! What gets written for a package

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::sanitize_package_name;

/// JSON record stored next to each saved page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    /// Visible text of the page
    pub content: String,
    pub links: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Rendered HTML plus its record
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPage {
    pub record: PageRecord,
    pub html: String,
}

/// A downloaded sub-resource
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// Everything stored for one package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageArtifacts {
    /// Stored as `index.html` + `metadata.json`
    pub main: SavedPage,
    /// Further crawled pages, stored under URL-derived names
    pub pages: Vec<SavedPage>,
    /// Written to `css/`
    pub stylesheets: Vec<Asset>,
    /// Written to `images/`
    pub images: Vec<Asset>,
}

impl PackageArtifacts {
    #[must_use]
    pub fn new(main: SavedPage) -> Self {
        Self {
            main,
            pages: Vec::new(),
            stylesheets: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// File name for a sub-resource: a short hash of the URL followed by the
/// last path segment, so two `logo.png` from different paths do not collide
#[must_use]
pub fn asset_file_name(url: &str) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "asset".to_string());

    let hash = xxhash_rust::xxh3::xxh3_64(url.as_bytes()) as u32;
    format!("{hash:08x}-{}", sanitize_package_name(&segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_names_keep_the_file_name() {
        let name = asset_file_name("https://react.dev/static/css/main.css?v=3");
        assert!(name.ends_with("-main.css"));
        assert_eq!(name.len(), 8 + 1 + "main.css".len());
    }

    #[test]
    fn same_file_name_on_different_paths_differs() {
        assert_ne!(
            asset_file_name("https://a.dev/x/logo.png"),
            asset_file_name("https://a.dev/y/logo.png")
        );
        assert!(asset_file_name("https://a.dev/").ends_with("-asset"));
    }
}

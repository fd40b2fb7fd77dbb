//! Choosing a documentation entry point for a package
//!
//! Order: the known-package table, then registry metadata (homepage, a
//! documentation link in the README, the repository), then the package's
//! page on the npm website.

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::registry::{PackageInfo, PackageInfoSource, known_docs_url};
use crate::url_manager::{is_documentation_url, normalize_url};
use crate::utils::is_valid_url;

/// Package index used when nothing better is known
pub const PACKAGE_INDEX_URL: &str = "https://www.npmjs.com/package";

/// Hosts whose links in a README are never documentation
const README_NOISE_HOSTS: [&str; 6] = [
    "shields.io",
    "badge",
    "travis-ci",
    "codecov.io",
    "npmjs.com",
    "opencollective.com",
];

static README_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s)\]>"'`]+"#).ok());

/// Which rule produced a documentation URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlSource {
    KnownPackage,
    Homepage,
    Readme,
    Repository,
    PackageIndex,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KnownPackage => "known package",
            Self::Homepage => "homepage",
            Self::Readme => "readme link",
            Self::Repository => "repository",
            Self::PackageIndex => "package index",
        };
        f.write_str(name)
    }
}

/// A documentation URL and how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub source: UrlSource,
}

/// Pick the documentation URL for `name`.
///
/// The registry is only consulted for packages missing from the known
/// table. A package the registry does not know fails with
/// [`ErrorCode::PackageNotFound`]; any other registry failure falls back to
/// the package index page.
pub async fn resolve_docs_url<S: PackageInfoSource>(name: &str, source: &S) -> FetchResult<ResolvedUrl> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FetchError::new(ErrorCode::InvalidInput, "Package name is empty"));
    }

    if let Some(url) = known_docs_url(name) {
        return Ok(ResolvedUrl {
            url: url.to_string(),
            source: UrlSource::KnownPackage,
        });
    }

    match source.get_package_info(name).await {
        Ok(info) => {
            if let Some(resolved) = from_package_info(&info) {
                return Ok(resolved);
            }
            debug!(target: "docs_fetcher::resolver", "No documentation link in metadata of {name}");
        }
        Err(e) if e.code() == ErrorCode::PackageNotFound => return Err(e),
        Err(e) => {
            warn!(target: "docs_fetcher::resolver", "Metadata lookup for {name} failed, using package index: {e}");
        }
    }

    Ok(ResolvedUrl {
        url: package_index_url(name),
        source: UrlSource::PackageIndex,
    })
}

/// `https://www.npmjs.com/package/<name>`
#[must_use]
pub fn package_index_url(name: &str) -> String {
    format!("{PACKAGE_INDEX_URL}/{}", name.trim())
}

/// Documentation URL derivable from registry metadata alone
#[must_use]
pub fn from_package_info(info: &PackageInfo) -> Option<ResolvedUrl> {
    let usable = |url: &str| {
        let normalized = normalize_url(url, None);
        is_valid_url(&normalized).then_some(normalized)
    };

    if let Some(url) = info.homepage.as_deref().and_then(usable) {
        return Some(ResolvedUrl {
            url,
            source: UrlSource::Homepage,
        });
    }

    if let Some(url) = info.readme.as_deref().and_then(readme_docs_link).and_then(|u| usable(&u)) {
        return Some(ResolvedUrl {
            url,
            source: UrlSource::Readme,
        });
    }

    info.repository.as_deref().and_then(usable).map(|url| ResolvedUrl {
        url,
        source: UrlSource::Repository,
    })
}

/// First link in `readme` that looks like documentation
#[must_use]
pub fn readme_docs_link(readme: &str) -> Option<String> {
    let re = README_LINK.as_ref()?;
    re.find_iter(readme)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']))
        .filter(|url| {
            let lower = url.to_ascii_lowercase();
            !README_NOISE_HOSTS.iter().any(|noise| lower.contains(noise))
        })
        .find(|url| is_documentation_url(url))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PackageInfo {
        PackageInfo {
            name: "widget".to_string(),
            ..PackageInfo::default()
        }
    }

    #[test]
    fn homepage_wins() {
        let info = PackageInfo {
            homepage: Some("https://widget.dev/#readme".to_string()),
            repository: Some("https://github.com/acme/widget".to_string()),
            ..info()
        };
        let resolved = from_package_info(&info).unwrap();
        assert_eq!(resolved.url, "https://widget.dev");
        assert_eq!(resolved.source, UrlSource::Homepage);
    }

    #[test]
    fn readme_link_before_repository() {
        let info = PackageInfo {
            readme: Some(
                "[![build](https://img.shields.io/badge/docs-ok.svg)](x) See the [guide](https://widget.dev/docs/intro)."
                    .to_string(),
            ),
            repository: Some("https://github.com/acme/widget".to_string()),
            ..info()
        };
        let resolved = from_package_info(&info).unwrap();
        assert_eq!(resolved.url, "https://widget.dev/docs/intro");
        assert_eq!(resolved.source, UrlSource::Readme);
    }

    #[test]
    fn repository_as_last_metadata_option() {
        let info = PackageInfo {
            homepage: Some("not a url".to_string()),
            repository: Some("https://github.com/acme/widget".to_string()),
            ..info()
        };
        assert_eq!(from_package_info(&info).unwrap().source, UrlSource::Repository);
        assert!(from_package_info(&self::info()).is_none());
    }

    #[test]
    fn index_url() {
        assert_eq!(
            package_index_url("@scope/pkg"),
            "https://www.npmjs.com/package/@scope/pkg"
        );
    }
}

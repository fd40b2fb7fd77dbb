//! Fetch run lifecycle and the data it produces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Where one package's fetch run is.
///
/// `Idle → Initialized → Resolving → Crawling → Parsing → Persisting → Closed`,
/// or `Failed` from any state after `Initialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchState {
    Idle,
    Initialized,
    Resolving,
    Crawling,
    Parsing,
    Persisting,
    Closed,
    Failed,
}

impl FetchState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Initialized => "initialized",
            Self::Resolving => "resolving",
            Self::Crawling => "crawling",
            Self::Parsing => "parsing",
            Self::Persisting => "persisting",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What one fetch run crawls. Fixed once resolution completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDocsTarget {
    pub name: String,
    pub resolved_url: Option<String>,
    pub allowed_domains: BTreeSet<String>,
    /// Pages visited at most
    pub max_depth: usize,
}

/// Title and URL of one crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
}

/// Processed documentation for one package, as cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedDocs {
    pub package: String,
    /// Entry page after redirects
    pub url: String,
    pub title: String,
    /// Rendered HTML of the entry page
    pub html: String,
    /// Visible text of the entry page
    pub content: String,
    pub description: String,
    pub links: Vec<String>,
    /// Every crawled page, entry page first
    pub pages: Vec<PageSummary>,
    pub fetched_at: DateTime<Utc>,
}

/// Result of [`super::DocsFetcher::fetch_docs`]
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub docs: FetchedDocs,
    /// Served from the cache without rendering anything
    pub from_cache: bool,
    /// Where the package's artifacts live
    pub package_dir: PathBuf,
}

//! Core configuration types for documentation fetching
//!
//! This module contains the `FetcherConfig` struct: everything the
//! orchestrator, cache, validator, scorer and registry client are tuned by.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::runtime::RetryPolicy;
use crate::scoring::ScoringOptions;
use crate::utils::{
    CACHE_DIR_ENV, DEFAULT_BATCH_LIMIT, DEFAULT_CACHE_MAX_SIZE_BYTES, DEFAULT_CACHE_SUBDIR,
    DEFAULT_CACHE_TTL_MS, DEFAULT_MAX_ASSETS_PER_KIND, DEFAULT_MAX_PAGES,
    DEFAULT_REGISTRY_TIMEOUT_SECS, DEFAULT_REGISTRY_URL, DEFAULT_RENDER_TIMEOUT_SECS,
    DEFAULT_VALIDATION_TIMEOUT_SECS,
};

/// Main configuration struct for documentation fetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Root directory holding the cache, package directories and stats file
    pub(crate) cache_root: PathBuf,

    /// Age after which a cache entry counts as expired
    ///
    /// Default: 24 hours
    pub(crate) cache_ttl_ms: u64,

    /// Upper bound on the summed size of every cache entry
    ///
    /// Default: 100 MiB
    pub(crate) cache_max_size_bytes: u64,

    /// Pages visited per package crawl, seed page included
    ///
    /// Default: 5
    pub(crate) max_pages: usize,

    /// Packages fetched concurrently in one batch
    ///
    /// Default: 15
    pub(crate) batch_limit: usize,

    /// Timeout in seconds for one page render
    ///
    /// Default: 30 seconds
    pub(crate) render_timeout_secs: u64,

    /// Timeout in seconds for one link validation request
    ///
    /// Default: 10 seconds
    pub(crate) validation_timeout_secs: u64,

    /// Timeout in seconds for one registry request
    ///
    /// Default: 10 seconds
    pub(crate) registry_timeout_secs: u64,

    /// Base URL of the package registry
    pub(crate) registry_url: String,

    /// Download stylesheets and images found on the seed page
    pub(crate) download_assets: bool,

    /// Cap on downloaded stylesheets, and separately on images
    pub(crate) max_assets_per_kind: usize,

    /// Run the browser without a window
    pub(crate) headless: bool,

    /// Content types the link validator accepts; empty accepts any
    pub(crate) allowed_content_types: Vec<String>,

    pub(crate) retry: RetryPolicy,

    pub(crate) scoring: ScoringOptions,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            cache_root: default_cache_root(),
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            cache_max_size_bytes: DEFAULT_CACHE_MAX_SIZE_BYTES,
            max_pages: DEFAULT_MAX_PAGES,
            batch_limit: DEFAULT_BATCH_LIMIT,
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            validation_timeout_secs: DEFAULT_VALIDATION_TIMEOUT_SECS,
            registry_timeout_secs: DEFAULT_REGISTRY_TIMEOUT_SECS,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            download_assets: true,
            max_assets_per_kind: DEFAULT_MAX_ASSETS_PER_KIND,
            headless: true,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            retry: RetryPolicy::default(),
            scoring: ScoringOptions::default(),
        }
    }
}

/// Cache root from `DOCS_FETCHER_CACHE_DIR`, else `<home>/.docs-fetcher`
#[must_use]
pub fn default_cache_root() -> PathBuf {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_CACHE_SUBDIR)
}

impl FetcherConfig {
    /// Load a config file; fields missing from the file keep their defaults
    pub fn load(path: impl AsRef<Path>) -> FetchResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FetchError::wrap(
                ErrorCode::ConfigLoadError,
                format!("Failed to read config file {}", path.display()),
                e,
            )
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            FetchError::wrap(
                ErrorCode::ConfigLoadError,
                format!("Failed to parse config file {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the components rely on
    pub fn validate(&self) -> FetchResult<()> {
        let invalid = |msg: &str| -> FetchResult<()> {
            Err(FetchError::new(ErrorCode::ValidationError, msg))
        };

        if self.batch_limit == 0 {
            return invalid("batch_limit must be at least 1");
        }
        if self.max_pages == 0 {
            return invalid("max_pages must be at least 1");
        }
        if self.render_timeout_secs == 0
            || self.validation_timeout_secs == 0
            || self.registry_timeout_secs == 0
        {
            return invalid("timeouts must be non-zero");
        }
        if self.cache_ttl_ms == 0 {
            return invalid("cache_ttl_ms must be non-zero");
        }
        if url::Url::parse(&self.registry_url).is_err() {
            return invalid("registry_url is not a valid URL");
        }
        self.scoring.validate()
    }
}

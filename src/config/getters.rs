//! Getter methods for `FetcherConfig`
//!
//! Accessors return `Duration`s for the millisecond and second fields and
//! derive the on-disk layout below the cache root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::FetcherConfig;
use crate::runtime::RetryPolicy;
use crate::scoring::ScoringOptions;

impl FetcherConfig {
    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Directory owned by the cache manager
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_root.join("cache")
    }

    /// Directory owned by the directory manager
    #[must_use]
    pub fn packages_dir(&self) -> PathBuf {
        self.cache_root.join("packages")
    }

    /// Flat registry metadata cache
    #[must_use]
    pub fn package_stats_file(&self) -> PathBuf {
        self.cache_root.join("package-stats.json")
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    #[must_use]
    pub fn cache_max_size_bytes(&self) -> u64 {
        self.cache_max_size_bytes
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    #[must_use]
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    #[must_use]
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }

    #[must_use]
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    #[must_use]
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    #[must_use]
    pub fn download_assets(&self) -> bool {
        self.download_assets
    }

    #[must_use]
    pub fn max_assets_per_kind(&self) -> usize {
        self.max_assets_per_kind
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub fn scoring(&self) -> &ScoringOptions {
        &self.scoring
    }
}

//! Fluent builder for `FetcherConfig`
//!
//! Every field starts from its default; `build()` validates the result so a
//! config that reaches the components is always usable.

use std::path::PathBuf;

use super::types::FetcherConfig;
use crate::errors::FetchResult;
use crate::runtime::RetryPolicy;
use crate::scoring::ScoringOptions;

#[derive(Debug, Clone, Default)]
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl FetcherConfig {
    /// Create a builder for configuring a `FetcherConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::default()
    }

    /// Continue building from an existing config (e.g. one loaded from a file)
    #[must_use]
    pub fn into_builder(self) -> FetcherConfigBuilder {
        FetcherConfigBuilder { config: self }
    }
}

impl FetcherConfigBuilder {
    #[must_use]
    pub fn cache_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_root = dir.into();
        self
    }

    #[must_use]
    pub fn cache_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.config.cache_ttl_ms = ttl_ms;
        self
    }

    #[must_use]
    pub fn cache_max_size_bytes(mut self, bytes: u64) -> Self {
        self.config.cache_max_size_bytes = bytes;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.config.max_pages = pages;
        self
    }

    #[must_use]
    pub fn batch_limit(mut self, limit: usize) -> Self {
        self.config.batch_limit = limit;
        self
    }

    #[must_use]
    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn validation_timeout_secs(mut self, secs: u64) -> Self {
        self.config.validation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn registry_timeout_secs(mut self, secs: u64) -> Self {
        self.config.registry_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn registry_url(mut self, url: impl Into<String>) -> Self {
        self.config.registry_url = url.into();
        self
    }

    #[must_use]
    pub fn download_assets(mut self, enabled: bool) -> Self {
        self.config.download_assets = enabled;
        self
    }

    #[must_use]
    pub fn max_assets_per_kind(mut self, max: usize) -> Self {
        self.config.max_assets_per_kind = max;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn allowed_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_content_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    #[must_use]
    pub fn scoring(mut self, options: ScoringOptions) -> Self {
        self.config.scoring = options;
        self
    }

    /// Validate and return the finished config
    pub fn build(self) -> FetchResult<FetcherConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

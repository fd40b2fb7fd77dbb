//! npm registry client with a flat on-disk stats cache
//!
//! Lookups are cached forever in a JSON file holding an array of
//! `[name, PackageInfo]` pairs. Only network misses reach the registry;
//! those go through the shared retry policy.

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;

use super::PackageInfoSource;
use super::package_info::PackageInfo;
use crate::config::FetcherConfig;
use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::runtime::{RetryPolicy, retry};
use crate::utils::{CHROME_USER_AGENT, write_atomic};

/// npm registry lookups
#[derive(Debug)]
pub struct NpmRegistry {
    client: Client,
    registry_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    stats_file: Option<PathBuf>,
    /// `None` until the stats file has been read
    stats: Mutex<Option<HashMap<String, PackageInfo>>>,
}

impl NpmRegistry {
    /// Client for `registry_url` without a stats file
    pub fn new(registry_url: &str, timeout: Duration, retry: RetryPolicy) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(CHROME_USER_AGENT)
            .build()
            .map_err(|e| FetchError::wrap(ErrorCode::InitError, "Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            registry_url: registry_url.trim_end_matches('/').to_string(),
            timeout,
            retry,
            stats_file: None,
            stats: Mutex::new(None),
        })
    }

    /// Client configured from `config`, caching into its package stats file
    pub fn from_config(config: &FetcherConfig) -> FetchResult<Self> {
        Ok(Self::new(config.registry_url(), config.registry_timeout(), config.retry().clone())?
            .with_stats_file(config.package_stats_file()))
    }

    #[must_use]
    pub fn with_stats_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn stats_file(&self) -> Option<&Path> {
        self.stats_file.as_deref()
    }

    /// Names currently held in the stats cache, sorted
    pub async fn cached_packages(&self) -> Vec<String> {
        let mut stats = self.stats.lock().await;
        let loaded = self.load_stats(&mut stats).await;
        let mut names: Vec<String> = loaded.keys().cloned().collect();
        names.sort();
        names
    }

    fn package_url(&self, name: &str) -> String {
        // Scoped names keep the '@' but escape the separator
        format!("{}/{}", self.registry_url, name.replace('/', "%2F"))
    }

    async fn fetch_remote(&self, name: &str) -> FetchResult<PackageInfo> {
        let url = self.package_url(name);
        let context = format!("Registry lookup for '{name}'");
        debug!(target: "docs_fetcher::registry", "GET {url}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&context, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::new(
                ErrorCode::PackageNotFound,
                format!("Package '{name}' not found in registry"),
            ));
        }
        if !status.is_success() {
            let code = match ErrorCode::from_http_status(status.as_u16()) {
                ErrorCode::NotFound => ErrorCode::NetworkError,
                code => code,
            };
            return Err(FetchError::new(code, format!("{context} failed: HTTP {status}")));
        }

        let doc: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(&context, e).recode(ErrorCode::PackageInfoError))?;

        Ok(PackageInfo::from_registry_document(name, &doc))
    }

    async fn load_stats<'a>(
        &self,
        stats: &'a mut Option<HashMap<String, PackageInfo>>,
    ) -> &'a mut HashMap<String, PackageInfo> {
        if stats.is_none() {
            let loaded = match &self.stats_file {
                Some(path) => read_stats_file(path).await,
                None => HashMap::new(),
            };
            *stats = Some(loaded);
        }
        stats.get_or_insert_with(HashMap::new)
    }

    async fn remember(&self, info: &PackageInfo) {
        let mut stats = self.stats.lock().await;
        let loaded = self.load_stats(&mut stats).await;
        loaded.insert(info.name.clone(), info.clone());

        let Some(path) = &self.stats_file else {
            return;
        };

        let mut pairs: Vec<(&String, &PackageInfo)> = loaded.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        let bytes = match serde_json::to_vec_pretty(&pairs) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(target: "docs_fetcher::registry", "Failed to serialize package stats: {e}");
                return;
            }
        };
        if let Err(e) = write_atomic(path, bytes).await {
            warn!(target: "docs_fetcher::registry", "Failed to write {}: {e}", path.display());
        }
    }
}

async fn read_stats_file(path: &Path) -> HashMap<String, PackageInfo> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(target: "docs_fetcher::registry", "Failed to read {}: {e}", path.display());
            return HashMap::new();
        }
    };

    match serde_json::from_slice::<Vec<(String, PackageInfo)>>(&bytes) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            warn!(target: "docs_fetcher::registry", "Ignoring malformed {}: {e}", path.display());
            HashMap::new()
        }
    }
}

impl PackageInfoSource for NpmRegistry {
    async fn get_package_info(&self, name: &str) -> FetchResult<PackageInfo> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FetchError::new(ErrorCode::InvalidInput, "Package name is empty"));
        }

        {
            let mut stats = self.stats.lock().await;
            if let Some(info) = self.load_stats(&mut stats).await.get(name) {
                debug!(target: "docs_fetcher::registry", "Package stats hit for '{name}'");
                return Ok(info.clone());
            }
        }

        let info = retry(&self.retry, "registry lookup", || self.fetch_remote(name)).await?;
        // Stored under the requested name so later lookups hit
        let info = PackageInfo {
            name: name.to_string(),
            ..info
        };
        self.remember(&info).await;
        Ok(info)
    }
}

//! Disk-backed cache with TTL expiry and a total size limit

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::entry::{CacheEntry, ENTRY_EXTENSION, cache_file_name, is_expired};
use super::stats::{CacheDirectoryInfo, CacheStats, scan_directory};
use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::utils::{DEFAULT_CACHE_MAX_SIZE_BYTES, DEFAULT_CACHE_TTL_MS, write_atomic};

/// TTL and size limit for a [`CacheManager`]
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOptions {
    pub ttl: Duration,
    /// Upper bound for the sum of entry sizes
    pub max_size: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            max_size: DEFAULT_CACHE_MAX_SIZE_BYTES,
        }
    }
}

/// Bookkeeping kept in memory for every entry file
#[derive(Debug, Clone)]
struct IndexEntry {
    file: PathBuf,
    timestamp: i64,
    size: u64,
    ttl: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    loaded: bool,
    index: HashMap<String, IndexEntry>,
    last_cleanup: Option<DateTime<Utc>>,
}

impl CacheState {
    fn total_size(&self) -> u64 {
        self.index.values().map(|e| e.size).sum()
    }
}

/// Key/value cache of `T` values stored as JSON files under one directory.
///
/// The directory is scanned lazily on first use. All operations are
/// serialized through one lock, so the size limit holds across concurrent
/// writers; concurrent writes to the same key are last-writer-wins.
#[derive(Debug)]
pub struct CacheManager<T> {
    dir: PathBuf,
    options: CacheOptions,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    _marker: PhantomData<fn() -> T>,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl<T> CacheManager<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, options: CacheOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Create the directory and index existing entries. Called implicitly by
    /// every other operation; calling it again is a no-op.
    pub async fn init(&self) -> FetchResult<()> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await
    }

    /// Store `data` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::CacheSizeError`] when the cache would grow past its
    /// maximum size; nothing is written in that case.
    pub async fn set_new(&self, key: &str, data: &T) -> FetchResult<()> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let size = serde_json::to_vec(data)
            .map_err(|e| FetchError::wrap(ErrorCode::CacheSetError, format!("Failed to serialize '{key}'"), e))?
            .len() as u64;

        let replaced = state.index.get(key).map_or(0, |e| e.size);
        let projected = state.total_size() - replaced + size;
        if projected > self.options.max_size {
            return Err(FetchError::new(
                ErrorCode::CacheSizeError,
                format!(
                    "Entry '{key}' ({size} bytes) would grow the cache to {projected} bytes, limit is {}",
                    self.options.max_size
                ),
            ));
        }

        let ttl = u64::try_from(self.options.ttl.as_millis()).unwrap_or(u64::MAX);
        let entry = CacheEntry {
            key: key.to_string(),
            data,
            timestamp: now_ms(),
            size,
            ttl,
        };
        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| FetchError::wrap(ErrorCode::CacheSetError, format!("Failed to serialize '{key}'"), e))?;

        let file = self.dir.join(cache_file_name(key));
        write_atomic(&file, bytes)
            .await
            .map_err(|e| FetchError::wrap(ErrorCode::CacheSetError, format!("Failed to write '{key}'"), e))?;

        state.index.insert(
            key.to_string(),
            IndexEntry {
                file,
                timestamp: entry.timestamp,
                size,
                ttl,
            },
        );
        debug!(target: "docs_fetcher::cache", "Cached '{key}' ({size} bytes)");
        Ok(())
    }

    /// Value stored under `key`, or `None` when missing or expired.
    /// Every call counts as a hit or a miss; expired entries are left on disk.
    pub async fn get(&self, key: &str) -> FetchResult<Option<T>> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let Some(indexed) = state.index.get(key).cloned() else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };

        if is_expired(indexed.timestamp, indexed.ttl, now_ms()) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(target: "docs_fetcher::cache", "Entry '{key}' expired");
            return Ok(None);
        }

        let bytes = match tokio::fs::read(&indexed.file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Removed behind our back
                state.index.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
            Err(e) => {
                return Err(FetchError::wrap(
                    ErrorCode::CacheGetError,
                    format!("Failed to read '{key}'"),
                    e,
                ));
            }
        };

        let entry: CacheEntry<T> = serde_json::from_slice(&bytes).map_err(|e| {
            FetchError::wrap(ErrorCode::CacheGetError, format!("Corrupt entry for '{key}'"), e)
        })?;

        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(entry.data))
    }

    /// Whether a live entry exists for `key`. Does not touch hit/miss counters.
    pub async fn has(&self, key: &str) -> FetchResult<bool> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;
        let now = now_ms();
        Ok(state
            .index
            .get(key)
            .is_some_and(|e| !is_expired(e.timestamp, e.ttl, now)))
    }

    /// Indexed keys in sorted order, expired ones included
    pub async fn keys(&self) -> FetchResult<Vec<String>> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;
        let mut keys: Vec<String> = state.index.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Remove the entry for `key`. Returns whether one existed.
    pub async fn delete(&self, key: &str) -> FetchResult<bool> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let Some(indexed) = state.index.remove(key) else {
            return Ok(false);
        };
        remove_file_if_present(&indexed.file).await.map_err(|e| {
            FetchError::wrap(ErrorCode::CacheDeleteError, format!("Failed to delete '{key}'"), e)
        })?;
        Ok(true)
    }

    /// Remove every entry
    pub async fn clear(&self) -> FetchResult<()> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let clear_error =
            |e: std::io::Error| FetchError::wrap(ErrorCode::CacheClearError, "Failed to clear cache", e);

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(clear_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(clear_error)? {
            let path = entry.path();
            if is_entry_file(&path) {
                remove_file_if_present(&path).await.map_err(clear_error)?;
            }
        }

        let removed = state.index.len();
        state.index.clear();
        info!(target: "docs_fetcher::cache", "Cleared {removed} cache entries");
        Ok(())
    }

    /// Remove every expired entry. Returns how many were removed.
    pub async fn cleanup(&self) -> FetchResult<usize> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let now = now_ms();
        let expired: Vec<String> = state
            .index
            .iter()
            .filter(|(_, e)| is_expired(e.timestamp, e.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(indexed) = state.index.get(key) {
                remove_file_if_present(&indexed.file).await.map_err(|e| {
                    FetchError::wrap(
                        ErrorCode::CacheCleanupError,
                        format!("Failed to remove expired '{key}'"),
                        e,
                    )
                })?;
            }
            state.index.remove(key);
        }

        state.last_cleanup = Some(Utc::now());
        if !expired.is_empty() {
            info!(target: "docs_fetcher::cache", "Removed {} expired cache entries", expired.len());
        }
        Ok(expired.len())
    }

    /// Counters and indexed totals
    pub async fn get_stats(&self) -> FetchResult<CacheStats> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state)
            .await
            .map_err(|e| e.recode(ErrorCode::CacheStatsError))?;

        Ok(CacheStats {
            size: state.total_size(),
            entries: state.index.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            last_cleanup: state.last_cleanup,
        })
    }

    /// What is on disk right now, independent of the in-memory index
    pub async fn get_directory_info(&self) -> FetchResult<CacheDirectoryInfo> {
        scan_directory(&self.dir).await
    }

    async fn ensure_loaded(&self, state: &mut CacheState) -> FetchResult<()> {
        if state.loaded {
            return Ok(());
        }

        let init_error = |e: std::io::Error| {
            FetchError::wrap(
                ErrorCode::CacheInitError,
                format!("Failed to initialize cache at {}", self.dir.display()),
                e,
            )
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(init_error)?;

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(init_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(init_error)? {
            let path = entry.path();
            if !is_entry_file(&path) {
                continue;
            }

            let bytes = tokio::fs::read(&path).await.map_err(init_error)?;
            match serde_json::from_slice::<CacheEntry<serde_json::Value>>(&bytes) {
                Ok(parsed) => {
                    state.index.insert(
                        parsed.key,
                        IndexEntry {
                            file: path,
                            timestamp: parsed.timestamp,
                            size: parsed.size,
                            ttl: parsed.ttl,
                        },
                    );
                }
                Err(e) => {
                    warn!(target: "docs_fetcher::cache", "Skipping unreadable cache file {}: {e}", path.display());
                }
            }
        }

        state.loaded = true;
        debug!(
            target: "docs_fetcher::cache",
            "Cache at {} holds {} entries",
            self.dir.display(),
            state.index.len()
        );
        Ok(())
    }
}

fn is_entry_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION)
}

async fn remove_file_if_present(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache(dir: &TempDir, max_size: u64) -> CacheManager<String> {
        CacheManager::new(
            dir.path().join("cache"),
            CacheOptions {
                ttl: Duration::from_secs(60),
                max_size,
            },
        )
    }

    #[tokio::test]
    async fn set_then_get_counts_hits_and_misses() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir, 1024);

        cache.set_new("react", &"docs".to_string()).await.unwrap();
        assert_eq!(cache.get("react").await.unwrap().as_deref(), Some("docs"));
        assert_eq!(cache.get("vue").await.unwrap(), None);

        let stats = cache.get_stats().await.unwrap();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
        assert_eq!(stats.size, 6);
    }

    #[tokio::test]
    async fn index_survives_reopen() {
        let dir = TempDir::new().unwrap();
        cache(&dir, 1024).set_new("a", &"one".to_string()).await.unwrap();

        let reopened = cache(&dir, 1024);
        assert_eq!(reopened.keys().await.unwrap(), vec!["a".to_string()]);
        assert!(reopened.has("a").await.unwrap());
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn replacing_a_key_does_not_double_count() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir, 10);

        cache.set_new("k", &"abcdef".to_string()).await.unwrap();
        cache.set_new("k", &"ghijkl".to_string()).await.unwrap();
        assert_eq!(cache.get_stats().await.unwrap().size, 8);
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir, 1024);

        cache.set_new("a", &"1".to_string()).await.unwrap();
        cache.set_new("b", &"2".to_string()).await.unwrap();
        assert!(cache.delete("a").await.unwrap());
        assert!(!cache.delete("a").await.unwrap());

        cache.clear().await.unwrap();
        assert!(cache.keys().await.unwrap().is_empty());
        assert_eq!(cache.get_directory_info().await.unwrap().files, 0);
    }
}

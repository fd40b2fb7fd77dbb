//! On-disk entry format

use serde::{Deserialize, Serialize};

/// Extension of every entry file
pub const ENTRY_EXTENSION: &str = "json";

/// One cached value with its bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub key: String,
    pub data: T,
    /// Write time, epoch milliseconds
    pub timestamp: i64,
    /// Serialized size of `data` in bytes
    pub size: u64,
    /// Time to live in milliseconds
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        is_expired(self.timestamp, self.ttl, now_ms)
    }
}

/// An entry is expired once strictly more than `ttl` has passed
#[must_use]
pub fn is_expired(timestamp: i64, ttl: u64, now_ms: i64) -> bool {
    now_ms.saturating_sub(timestamp) > i64::try_from(ttl).unwrap_or(i64::MAX)
}

/// File name holding `key`: xxh3 of the key in hex
#[must_use]
pub fn cache_file_name(key: &str) -> String {
    let hash = xxhash_rust::xxh3::xxh3_64(key.as_bytes());
    format!("{hash:016x}.{ENTRY_EXTENSION}")
}

//! Cache counters and on-disk accounting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::entry::ENTRY_EXTENSION;
use crate::errors::{ErrorCode, FetchError, FetchResult};

/// In-memory view of the cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Sum of indexed entry sizes in bytes
    pub size: u64,
    /// Indexed entries, expired ones included until cleanup
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub last_cleanup: Option<DateTime<Utc>>,
}

/// What is actually on disk under the cache directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDirectoryInfo {
    pub exists: bool,
    pub is_writable: bool,
    /// Sum of entry file lengths in bytes
    pub size: u64,
    pub files: usize,
    /// Newest entry file modification time
    pub last_modified: Option<DateTime<Utc>>,
}

/// Scan `dir` for entry files
pub async fn scan_directory(dir: &Path) -> FetchResult<CacheDirectoryInfo> {
    let info_error = |e: std::io::Error| {
        FetchError::wrap(
            ErrorCode::CacheInfoError,
            format!("Failed to read cache directory {}", dir.display()),
            e,
        )
    };

    let metadata = match tokio::fs::metadata(dir).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(CacheDirectoryInfo::default());
        }
        Err(e) => return Err(info_error(e)),
    };

    let mut info = CacheDirectoryInfo {
        exists: metadata.is_dir(),
        is_writable: metadata.is_dir() && !metadata.permissions().readonly(),
        ..CacheDirectoryInfo::default()
    };
    if !info.exists {
        return Ok(info);
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(info_error)?;
    while let Some(entry) = entries.next_entry().await.map_err(info_error)? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
            continue;
        }
        let file_meta = entry.metadata().await.map_err(info_error)?;
        if !file_meta.is_file() {
            continue;
        }

        info.files += 1;
        info.size += file_meta.len();
        if let Ok(modified) = file_meta.modified() {
            let modified: DateTime<Utc> = modified.into();
            if info.last_modified.is_none_or(|newest| modified > newest) {
                info.last_modified = Some(modified);
            }
        }
    }

    Ok(info)
}

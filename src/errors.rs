//! Error types for documentation fetching
//!
//! Every failure carries a stable [`ErrorCode`] plus a human-readable message.
//! Low-level components degrade instead of failing; the codes below are what
//! the fetch, cache and registry layers surface when they cannot.

use std::fmt;
use thiserror::Error;

/// Result type alias for fetcher operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Broad class an [`ErrorCode`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    Resource,
    Cache,
    PackageInfo,
    Documentation,
    Validation,
    Config,
    Unknown,
}

/// Stable error codes, one per failure the fetcher distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Network
    NetworkError,
    Timeout,
    RateLimit,
    // Resource
    NotFound,
    ParseError,
    InvalidData,
    // Cache, one per operation
    CacheInitError,
    CacheSetError,
    CacheGetError,
    CacheDeleteError,
    CacheClearError,
    CacheCleanupError,
    CacheStatsError,
    CacheInfoError,
    CacheSizeError,
    // Package info
    PackageInfoError,
    PackageNotFound,
    PackageVersionError,
    // Documentation
    DocsNotFound,
    DocsFetchError,
    DocsParseError,
    DocsScoringError,
    DocsProcessingError,
    // Validation
    ValidationError,
    InvalidUrl,
    InvalidContentType,
    InvalidInput,
    // Config / filesystem
    ConfigLoadError,
    DirectoryError,
    InitError,
    FileWriteError,
    FileReadError,
    Unknown,
}

impl ErrorCode {
    /// The stable string form used in logs and CLI output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::RateLimit => "RATE_LIMIT",
            Self::NotFound => "NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidData => "INVALID_DATA",
            Self::CacheInitError => "CACHE_INIT_ERROR",
            Self::CacheSetError => "CACHE_SET_ERROR",
            Self::CacheGetError => "CACHE_GET_ERROR",
            Self::CacheDeleteError => "CACHE_DELETE_ERROR",
            Self::CacheClearError => "CACHE_CLEAR_ERROR",
            Self::CacheCleanupError => "CACHE_CLEANUP_ERROR",
            Self::CacheStatsError => "CACHE_STATS_ERROR",
            Self::CacheInfoError => "CACHE_INFO_ERROR",
            Self::CacheSizeError => "CACHE_SIZE_ERROR",
            Self::PackageInfoError => "PACKAGE_INFO_ERROR",
            Self::PackageNotFound => "PACKAGE_NOT_FOUND",
            Self::PackageVersionError => "PACKAGE_VERSION_ERROR",
            Self::DocsNotFound => "DOCS_NOT_FOUND",
            Self::DocsFetchError => "DOCS_FETCH_ERROR",
            Self::DocsParseError => "DOCS_PARSE_ERROR",
            Self::DocsScoringError => "DOCS_SCORING_ERROR",
            Self::DocsProcessingError => "DOCS_PROCESSING_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidContentType => "INVALID_CONTENT_TYPE",
            Self::InvalidInput => "INVALID_INPUT",
            Self::ConfigLoadError => "CONFIG_LOAD_ERROR",
            Self::DirectoryError => "DIRECTORY_ERROR",
            Self::InitError => "INIT_ERROR",
            Self::FileWriteError => "FILE_WRITE_ERROR",
            Self::FileReadError => "FILE_READ_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NetworkError | Self::Timeout | Self::RateLimit => ErrorCategory::Network,
            Self::NotFound | Self::ParseError | Self::InvalidData => ErrorCategory::Resource,
            Self::CacheInitError
            | Self::CacheSetError
            | Self::CacheGetError
            | Self::CacheDeleteError
            | Self::CacheClearError
            | Self::CacheCleanupError
            | Self::CacheStatsError
            | Self::CacheInfoError
            | Self::CacheSizeError => ErrorCategory::Cache,
            Self::PackageInfoError | Self::PackageNotFound | Self::PackageVersionError => {
                ErrorCategory::PackageInfo
            }
            Self::DocsNotFound
            | Self::DocsFetchError
            | Self::DocsParseError
            | Self::DocsScoringError
            | Self::DocsProcessingError => ErrorCategory::Documentation,
            Self::ValidationError
            | Self::InvalidUrl
            | Self::InvalidContentType
            | Self::InvalidInput => ErrorCategory::Validation,
            Self::ConfigLoadError
            | Self::DirectoryError
            | Self::InitError
            | Self::FileWriteError
            | Self::FileReadError => ErrorCategory::Config,
            Self::Unknown => ErrorCategory::Unknown,
        }
    }

    /// Whether an operation failing with this code is worth retrying
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::Timeout | Self::RateLimit | Self::Unknown
        )
    }

    /// Map a non-success HTTP status to the code describing it
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            404 | 410 => Self::NotFound,
            429 => Self::RateLimit,
            408 | 504 => Self::Timeout,
            _ => Self::NetworkError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every fallible fetcher operation
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct FetchError {
    code: ErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl FetchError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying cause, keeping its message in ours
    #[must_use]
    pub fn wrap<E>(code: ErrorCode, context: impl fmt::Display, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            code,
            message: format!("{context}: {cause}"),
            source: Some(Box::new(cause)),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Classify a `reqwest` failure
    #[must_use]
    pub fn from_reqwest(context: impl fmt::Display, err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::Timeout
        } else if let Some(status) = err.status() {
            ErrorCode::from_http_status(status.as_u16())
        } else if err.is_decode() {
            ErrorCode::ParseError
        } else {
            ErrorCode::NetworkError
        };
        Self::wrap(code, context, err)
    }

    /// Same error with a different code, message and cause kept
    #[must_use]
    pub fn recode(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::new(ErrorCode::Unknown, format!("{err:#}"))
    }
}

//! Shared configuration constants for the documentation fetcher
//!
//! Default values used by the config builder and the components it feeds,
//! kept here so the numbers exist in one place.

/// Environment variable overriding the cache root directory
pub const CACHE_DIR_ENV: &str = "DOCS_FETCHER_CACHE_DIR";

/// Directory under the user's home used when no cache root is configured
pub const DEFAULT_CACHE_SUBDIR: &str = ".docs-fetcher";

/// Cache entries live for a day unless configured otherwise
pub const DEFAULT_CACHE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// 100 MiB across every cache entry
pub const DEFAULT_CACHE_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Pages visited per package crawl (seed page included)
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Packages fetched concurrently by a batch run
pub const DEFAULT_BATCH_LIMIT: usize = 15;

/// Timeout for one page render (navigation + load)
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Timeout for one link validation request
pub const DEFAULT_VALIDATION_TIMEOUT_SECS: u64 = 10;

/// Timeout for one registry metadata request
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 10;

/// Public npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Sub-resources of one kind (stylesheets, images) downloaded per package
pub const DEFAULT_MAX_ASSETS_PER_KIND: usize = 20;

/// Redirects followed by the link validator
pub const MAX_REDIRECTS: usize = 10;

/// Stable name of the main artifact in every package directory
pub const MAIN_ARTIFACT_FILE: &str = "index.html";

/// Metadata record stored next to the main artifact
pub const METADATA_FILE: &str = "metadata.json";

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

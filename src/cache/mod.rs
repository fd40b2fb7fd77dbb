//! Cache Manager
//!
//! TTL and size bounded key/value store on disk. Each entry lives in its own
//! JSON file named after a hash of its key. Expired entries are reported as
//! misses but stay on disk until [`CacheManager::cleanup`] runs.

// Sub-modules
pub mod entry;
pub mod manager;
pub mod stats;

// Re-exports for public API
pub use entry::{CacheEntry, cache_file_name};
pub use manager::{CacheManager, CacheOptions};
pub use stats::{CacheDirectoryInfo, CacheStats};

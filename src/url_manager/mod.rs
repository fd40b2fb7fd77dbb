//! URL Manager
//!
//! Normalizes, deduplicates and queues candidate documentation URLs for one
//! crawl run, within an allowed-domain list and a visited-page budget.

pub mod classify;
pub mod queue;

pub use classify::{DOCUMENTATION_PATTERNS, is_documentation_url};
pub use queue::{CrawlQueueEntry, UrlManager, UrlManagerOptions, normalize_url};

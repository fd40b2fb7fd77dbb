//! Fetch Orchestrator
//!
//! Ties URL resolution, the crawl queue, rendering, parsing, storage and
//! scoring together. See [`DocsFetcher`].

// Sub-modules
pub mod batch;
pub mod orchestrator;
pub mod progress;
pub mod resolver;
pub mod state;

// Re-exports for public API
pub use batch::BatchReport;
pub use orchestrator::DocsFetcher;
pub use progress::{LogProgress, NoOpProgress, ProgressReporter};
pub use resolver::{PACKAGE_INDEX_URL, ResolvedUrl, UrlSource, package_index_url, resolve_docs_url};
pub use state::{FetchOutcome, FetchState, FetchedDocs, PackageDocsTarget, PageSummary};

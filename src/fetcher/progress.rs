//! Progress reporting for fetch runs
//!
//! The orchestrator never logs lifecycle events itself; it reports them to
//! an injected [`ProgressReporter`]. [`LogProgress`] forwards them to the
//! `log` facade, [`NoOpProgress`] drops them.

use log::{info, warn};

use super::resolver::UrlSource;
use super::state::FetchState;

/// Receives lifecycle events from a [`super::DocsFetcher`]
pub trait ProgressReporter: Send + Sync {
    /// A package's fetch run moved to `state`
    fn report_state(&self, package: &str, state: FetchState);

    /// Cached documentation was returned without fetching
    fn report_cache_hit(&self, package: &str);

    /// The documentation entry point for `package` was chosen
    fn report_url_resolved(&self, package: &str, url: &str, source: UrlSource);

    /// A page finished rendering
    fn report_page_rendered(&self, package: &str, url: &str);

    /// Something non-fatal went wrong (a page or sub-resource was skipped)
    fn report_warning(&self, package: &str, message: &str);

    /// A package's documentation was stored
    fn report_completed(&self, package: &str, pages: usize);

    /// A package's fetch run failed
    fn report_error(&self, package: &str, error: &str);

    /// Batch number `batch` (0-based) is starting
    fn report_batch_started(&self, batch: usize, packages: &[String]);

    /// Batch number `batch` finished, every package in it settled
    fn report_batch_completed(&self, batch: usize);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_state(&self, _package: &str, _state: FetchState) {}

    #[inline(always)]
    fn report_cache_hit(&self, _package: &str) {}

    #[inline(always)]
    fn report_url_resolved(&self, _package: &str, _url: &str, _source: UrlSource) {}

    #[inline(always)]
    fn report_page_rendered(&self, _package: &str, _url: &str) {}

    #[inline(always)]
    fn report_warning(&self, _package: &str, _message: &str) {}

    #[inline(always)]
    fn report_completed(&self, _package: &str, _pages: usize) {}

    #[inline(always)]
    fn report_error(&self, _package: &str, _error: &str) {}

    #[inline(always)]
    fn report_batch_started(&self, _batch: usize, _packages: &[String]) {}

    #[inline(always)]
    fn report_batch_completed(&self, _batch: usize) {}
}

/// Forwards progress to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_state(&self, package: &str, state: FetchState) {
        log::debug!(target: "docs_fetcher::fetch", "{package}: {state}");
    }

    fn report_cache_hit(&self, package: &str) {
        info!(target: "docs_fetcher::fetch", "{package}: using cached documentation");
    }

    fn report_url_resolved(&self, package: &str, url: &str, source: UrlSource) {
        info!(target: "docs_fetcher::fetch", "{package}: documentation at {url} ({source})");
    }

    fn report_page_rendered(&self, package: &str, url: &str) {
        info!(target: "docs_fetcher::fetch", "{package}: rendered {url}");
    }

    fn report_warning(&self, package: &str, message: &str) {
        warn!(target: "docs_fetcher::fetch", "{package}: {message}");
    }

    fn report_completed(&self, package: &str, pages: usize) {
        info!(target: "docs_fetcher::fetch", "{package}: stored {pages} page(s)");
    }

    fn report_error(&self, package: &str, error: &str) {
        log::error!(target: "docs_fetcher::fetch", "{package}: {error}");
    }

    fn report_batch_started(&self, batch: usize, packages: &[String]) {
        info!(
            target: "docs_fetcher::fetch",
            "Batch {}: {}",
            batch + 1,
            packages.join(", ")
        );
    }

    fn report_batch_completed(&self, batch: usize) {
        info!(target: "docs_fetcher::fetch", "Batch {} complete", batch + 1);
    }
}

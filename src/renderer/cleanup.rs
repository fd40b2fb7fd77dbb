//! Browser shutdown

use chromiumoxide::Browser;
use log::{debug, warn};
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    Success,
    /// Cleanup finished, but some steps failed
    PartialFailure(Vec<String>),
}

/// A launched browser, its CDP handler task and its profile directory
pub struct LaunchedBrowser {
    pub(crate) browser: Browser,
    pub(crate) handler: JoinHandle<()>,
    pub(crate) user_data_dir: Option<PathBuf>,
}

impl LaunchedBrowser {
    #[must_use]
    pub fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }
}

impl std::fmt::Debug for LaunchedBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchedBrowser")
            .field("user_data_dir", &self.user_data_dir)
            .finish_non_exhaustive()
    }
}

impl Drop for LaunchedBrowser {
    fn drop(&mut self) {
        self.handler.abort();
        // Only reached without shutdown(); Browser's own Drop kills the process
        if let Some(dir) = self.user_data_dir.take() {
            warn!(target: "docs_fetcher::cleanup", "Browser dropped without shutdown, removing {}", dir.display());
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                warn!(target: "docs_fetcher::cleanup", "Failed to remove {}: {e}", dir.display());
            }
        }
    }
}

/// Close the browser, wait for its process and remove its profile directory
pub async fn shutdown(mut launched: LaunchedBrowser) -> CleanupResult {
    let mut errors = Vec::new();

    debug!(target: "docs_fetcher::cleanup", "Closing browser");
    if let Err(e) = launched.browser.close().await {
        warn!(target: "docs_fetcher::cleanup", "Failed to close browser: {e}");
        errors.push(format!("Browser close failed: {e}"));
    }

    if let Err(e) = launched.browser.wait().await {
        warn!(target: "docs_fetcher::cleanup", "Failed to wait for browser exit: {e}");
        errors.push(format!("Browser wait failed: {e}"));
    }

    launched.handler.abort();

    if let Some(dir) = launched.user_data_dir.take() {
        debug!(target: "docs_fetcher::cleanup", "Removing browser profile {}", dir.display());
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(target: "docs_fetcher::cleanup", "Failed to remove browser profile: {e}");
            errors.push(format!("Directory cleanup failed: {e}"));
        }
    }

    if errors.is_empty() {
        CleanupResult::Success
    } else {
        CleanupResult::PartialFailure(errors)
    }
}

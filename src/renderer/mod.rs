//! Page rendering
//!
//! [`PageRenderer`] is the seam between the orchestrator and whatever loads
//! pages. [`ChromiumRenderer`] drives a headless Chrome through
//! `chromiumoxide`; tests substitute a scripted renderer.

// Sub-modules
pub mod browser_setup;
pub mod chromium;
pub mod cleanup;

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::errors::FetchResult;

// Re-exports for public API
pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use chromium::ChromiumRenderer;
pub use cleanup::CleanupResult;

/// Sub-resources referenced by a rendered page, as absolute URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAssets {
    pub stylesheets: Vec<String>,
    pub images: Vec<String>,
}

/// A page after scripts ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// URL after redirects
    pub url: String,
    pub html: String,
    pub title: String,
    pub assets: PageAssets,
}

/// Loads pages and their sub-resources.
///
/// One renderer is shared by every fetch an orchestrator runs. Each
/// `navigate` call must use its own isolated browsing state and release it
/// before returning, whether it succeeded or not.
pub trait PageRenderer: Send + Sync {
    /// Load `url` and return its rendered HTML
    fn navigate(&self, url: &str) -> impl Future<Output = FetchResult<RenderedPage>> + Send;

    /// Download a stylesheet, image or other sub-resource
    fn fetch_subresource(&self, url: &str) -> impl Future<Output = FetchResult<Vec<u8>>> + Send;

    /// Release the underlying browser. Further calls to `navigate` fail.
    fn close(&self) -> impl Future<Output = FetchResult<()>> + Send;
}

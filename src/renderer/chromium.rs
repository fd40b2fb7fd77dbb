//! Headless Chrome renderer
//!
//! Every navigation runs in a fresh browser context (its own cookies and
//! storage) holding one page. Page and context are released on every exit
//! path before `navigate` returns.

use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::error::CdpError;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::RwLock;

use super::cleanup::{CleanupResult, LaunchedBrowser, shutdown};
use super::{PageAssets, PageRenderer, RenderedPage, browser_setup};
use crate::config::FetcherConfig;
use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::runtime::with_timeout;
use crate::utils::CHROME_USER_AGENT;

/// Collects stylesheet and image URLs, resolved by the browser
const ASSETS_SCRIPT: &str = r#"
(() => ({
    stylesheets: Array.from(document.querySelectorAll('link[rel="stylesheet"][href]'))
        .map(link => link.href)
        .filter(href => href.startsWith('http')),
    images: Array.from(document.images)
        .map(img => img.currentSrc || img.src)
        .filter(src => src && src.startsWith('http'))
}))()
"#;

fn cdp_error(context: &str, err: CdpError) -> FetchError {
    let code = match err {
        CdpError::Timeout => ErrorCode::Timeout,
        _ => ErrorCode::NetworkError,
    };
    FetchError::new(code, format!("{context}: {err}"))
}

/// [`PageRenderer`] backed by one shared Chrome process
#[derive(Debug)]
pub struct ChromiumRenderer {
    browser: RwLock<Option<LaunchedBrowser>>,
    http: reqwest::Client,
    render_timeout: Duration,
}

impl ChromiumRenderer {
    /// Launch Chrome according to `config`
    pub async fn launch(config: &FetcherConfig) -> FetchResult<Self> {
        let launched = browser_setup::launch_browser(config.headless(), config.cache_root()).await?;

        let http = reqwest::Client::builder()
            .user_agent(CHROME_USER_AGENT)
            .build()
            .map_err(|e| FetchError::wrap(ErrorCode::InitError, "Failed to build HTTP client", e))?;

        Ok(Self {
            browser: RwLock::new(Some(launched)),
            http,
            render_timeout: config.render_timeout(),
        })
    }

    /// Profile directory of the running browser, `None` once closed
    pub async fn user_data_dir(&self) -> Option<PathBuf> {
        self.browser
            .read()
            .await
            .as_ref()
            .and_then(|b| b.user_data_dir.clone())
    }

    async fn render_isolated(&self, browser: &Browser, url: &str) -> FetchResult<RenderedPage> {
        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| cdp_error("Failed to create browser context", e))?
            .result
            .browser_context_id;

        let result = self.render_in_context(browser, &context_id, url).await;

        if let Err(e) = browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            warn!(target: "docs_fetcher::renderer", "Failed to dispose browser context for {url}: {e}");
        }

        result
    }

    async fn render_in_context(
        &self,
        browser: &Browser,
        context_id: &BrowserContextId,
        url: &str,
    ) -> FetchResult<RenderedPage> {
        let mut params = CreateTargetParams::new("about:blank");
        params.browser_context_id = Some(context_id.clone());

        let page = browser
            .new_page(params)
            .await
            .map_err(|e| cdp_error("Failed to create page", e))?;

        let result = with_timeout(self.render_timeout, "Page render", load_page(&page, url)).await;

        if let Err(e) = page.close().await {
            debug!(target: "docs_fetcher::renderer", "Failed to close page for {url}: {e}");
        }

        result
    }
}

async fn load_page(page: &Page, url: &str) -> FetchResult<RenderedPage> {
    page.goto(url)
        .await
        .map_err(|e| cdp_error(&format!("Navigation to {url} failed"), e))?;
    page.wait_for_navigation()
        .await
        .map_err(|e| cdp_error(&format!("Page load of {url} failed"), e))?;

    let html = page
        .content()
        .await
        .map_err(|e| cdp_error(&format!("Failed to read content of {url}"), e))?;
    let title = page.get_title().await.ok().flatten().unwrap_or_default();
    let final_url = page
        .url()
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| url.to_string());

    let assets = match page.evaluate(ASSETS_SCRIPT).await {
        Ok(result) => result.into_value::<PageAssets>().unwrap_or_default(),
        Err(e) => {
            debug!(target: "docs_fetcher::renderer", "Asset discovery failed on {url}: {e}");
            PageAssets::default()
        }
    };

    Ok(RenderedPage {
        url: final_url,
        html,
        title,
        assets,
    })
}

impl PageRenderer for ChromiumRenderer {
    async fn navigate(&self, url: &str) -> FetchResult<RenderedPage> {
        let guard = self.browser.read().await;
        let Some(launched) = guard.as_ref() else {
            return Err(FetchError::new(ErrorCode::InitError, "Renderer is closed"));
        };

        debug!(target: "docs_fetcher::renderer", "Rendering {url}");
        self.render_isolated(launched.browser(), url).await
    }

    async fn fetch_subresource(&self, url: &str) -> FetchResult<Vec<u8>> {
        let context = format!("Failed to fetch {url}");
        let response = self
            .http
            .get(url)
            .timeout(self.render_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&context, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                ErrorCode::from_http_status(status.as_u16()),
                format!("{context}: HTTP {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&context, e))?;
        Ok(bytes.to_vec())
    }

    async fn close(&self) -> FetchResult<()> {
        let Some(launched) = self.browser.write().await.take() else {
            return Ok(());
        };

        match shutdown(launched).await {
            CleanupResult::Success => info!(target: "docs_fetcher::cleanup", "Browser closed"),
            CleanupResult::PartialFailure(errors) => {
                warn!(target: "docs_fetcher::cleanup", "Browser closed with errors: {}", errors.join("; "));
            }
        }
        Ok(())
    }
}

//! Test utilities shared by the docs_fetcher integration tests

use docs_fetcher::config::FetcherConfig;
use docs_fetcher::errors::{ErrorCode, FetchError, FetchResult};
use docs_fetcher::fetcher::{FetchState, ProgressReporter, UrlSource};
use docs_fetcher::registry::{PackageInfo, PackageInfoSource};
use docs_fetcher::renderer::{PageAssets, PageRenderer, RenderedPage};
use docs_fetcher::runtime::RetryPolicy;
use mockito::{Mock, Server};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="description" content="{title} documentation">
    <title>{title}</title>
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// A documentation-like page: headings, prose, a code block, links
#[allow(dead_code)]
pub fn create_docs_html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">{href}</a></li>"#))
        .collect();

    create_test_html(
        title,
        &format!(
            r#"<h1>{title}</h1>
    <p>This guide explains how to install the library and use it in your project. The API is small and the examples below cover the common cases.</p>
    <h2>Installation</h2>
    <p>Install the package with your package manager, then import it where you need it.</p>
    <pre><code>npm install {title}</code></pre>
    <h2>Usage</h2>
    <p>Call the exported function with your options and read the result. Every option has a sensible default.</p>
    <ul>{anchors}</ul>"#
        ),
    )
}

/// Config rooted in `root` with retries that do not sleep long
#[allow(dead_code)]
pub fn test_config(root: &Path) -> FetcherConfig {
    FetcherConfig::builder()
        .cache_root(root)
        .max_pages(3)
        .batch_limit(2)
        .retry(RetryPolicy {
            max_attempts: 2,
            base_delay_ms: 1,
            backoff_factor: 1.0,
            max_delay_ms: 1,
            jitter: false,
        })
        .build()
        .expect("valid test config")
}

/// Creates a mock endpoint that returns HTML content
#[allow(dead_code)]
pub async fn create_html_mock(server: &mut Server, method: &str, path: &str, html: &str) -> Mock {
    server
        .mock(method, path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(html)
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &Server, path: &str) -> String {
    format!("{}{}", server.url(), path)
}

enum Scripted {
    Page(RenderedPage),
    Failure(ErrorCode),
}

/// In-memory renderer serving scripted pages
#[derive(Default)]
pub struct MockRenderer {
    pages: Mutex<HashMap<String, Scripted>>,
    assets: Mutex<HashMap<String, Vec<u8>>>,
    navigations: Mutex<Vec<String>>,
    closed: AtomicUsize,
}

#[allow(dead_code)]
impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`
    pub fn page(self, url: &str, html: &str) -> Self {
        self.page_with_assets(url, html, PageAssets::default())
    }

    pub fn page_with_assets(self, url: &str, html: &str, assets: PageAssets) -> Self {
        let title = docs_fetcher::parse_html(html)
            .map(|doc| doc.title)
            .unwrap_or_default();
        self.pages.lock().unwrap().insert(
            url.to_string(),
            Scripted::Page(RenderedPage {
                url: url.to_string(),
                html: html.to_string(),
                title,
                assets,
            }),
        );
        self
    }

    /// Fail every navigation to `url` with `code`
    pub fn failing(self, url: &str, code: ErrorCode) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Failure(code));
        self
    }

    pub fn asset(self, url: &str, bytes: &[u8]) -> Self {
        self.assets
            .lock()
            .unwrap()
            .insert(url.to_string(), bytes.to_vec());
        self
    }

    /// URLs navigated to, in call order
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn navigation_count(&self, url: &str) -> usize {
        self.navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|u| *u == url)
            .count()
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl PageRenderer for MockRenderer {
    async fn navigate(&self, url: &str) -> FetchResult<RenderedPage> {
        self.navigations.lock().unwrap().push(url.to_string());

        match self.pages.lock().unwrap().get(url) {
            Some(Scripted::Page(page)) => Ok(page.clone()),
            Some(Scripted::Failure(code)) => Err(FetchError::new(*code, format!("scripted failure for {url}"))),
            None => Err(FetchError::new(ErrorCode::NotFound, format!("no page scripted for {url}"))),
        }
    }

    async fn fetch_subresource(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.assets
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(ErrorCode::NotFound, format!("no asset scripted for {url}")))
    }

    async fn close(&self) -> FetchResult<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory registry counting lookups
#[derive(Default)]
pub struct MockRegistry {
    packages: HashMap<String, PackageInfo>,
    failures: HashMap<String, ErrorCode>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_homepage(mut self, name: &str, homepage: &str) -> Self {
        self.packages.insert(
            name.to_string(),
            PackageInfo {
                name: name.to_string(),
                homepage: Some(homepage.to_string()),
                ..PackageInfo::default()
            },
        );
        self
    }

    pub fn with_info(mut self, info: PackageInfo) -> Self {
        self.packages.insert(info.name.clone(), info);
        self
    }

    pub fn failing(mut self, name: &str, code: ErrorCode) -> Self {
        self.failures.insert(name.to_string(), code);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl PackageInfoSource for MockRegistry {
    async fn get_package_info(&self, name: &str) -> FetchResult<PackageInfo> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(code) = self.failures.get(name) {
            return Err(FetchError::new(*code, format!("scripted failure for {name}")));
        }
        self.packages
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::new(ErrorCode::PackageNotFound, format!("Package {name} not found")))
    }
}

/// Progress reporter recording every event as a string
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn states(&self, package: &str) -> Vec<String> {
        let prefix = format!("state {package} ");
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for RecordingProgress {
    fn report_state(&self, package: &str, state: FetchState) {
        self.push(format!("state {package} {state}"));
    }

    fn report_cache_hit(&self, package: &str) {
        self.push(format!("cache-hit {package}"));
    }

    fn report_url_resolved(&self, package: &str, url: &str, source: UrlSource) {
        self.push(format!("resolved {package} {url} {source}"));
    }

    fn report_page_rendered(&self, package: &str, url: &str) {
        self.push(format!("rendered {package} {url}"));
    }

    fn report_warning(&self, package: &str, message: &str) {
        self.push(format!("warning {package} {message}"));
    }

    fn report_completed(&self, package: &str, pages: usize) {
        self.push(format!("completed {package} {pages}"));
    }

    fn report_error(&self, package: &str, error: &str) {
        self.push(format!("error {package} {error}"));
    }

    fn report_batch_started(&self, batch: usize, packages: &[String]) {
        self.push(format!("batch-started {batch} {}", packages.join(",")));
    }

    fn report_batch_completed(&self, batch: usize) {
        self.push(format!("batch-completed {batch}"));
    }
}

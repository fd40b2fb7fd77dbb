//! Fetch Orchestrator
//!
//! Owns one renderer, one registry client, the cache and the packages
//! directory, and drives each package through
//! resolve → crawl → parse → persist. Crawl state lives in a fresh
//! [`UrlManager`] per run and is never shared between packages.

use chrono::Utc;
use futures::future::join_all;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

use super::batch::BatchReport;
use super::progress::{NoOpProgress, ProgressReporter};
use super::resolver::{ResolvedUrl, resolve_docs_url};
use super::state::{FetchOutcome, FetchState, FetchedDocs, PackageDocsTarget, PageSummary};
use crate::cache::{CacheManager, CacheOptions};
use crate::config::FetcherConfig;
use crate::content_saver::{Asset, DirectoryManager, PackageArtifacts, PageRecord, SavedPage};
use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::link_validator::{LinkValidationOptions, LinkValidator};
use crate::page_extractor::{ParsedDocument, parse_html};
use crate::registry::PackageInfoSource;
use crate::renderer::{PageRenderer, RenderedPage};
use crate::runtime::retry;
use crate::scoring::{DocumentationScore, DocumentationScorer};
use crate::url_manager::{UrlManager, UrlManagerOptions, is_documentation_url, normalize_url};

const LIFECYCLE_IDLE: u8 = 0;
const LIFECYCLE_INITIALIZED: u8 = 1;
const LIFECYCLE_CLOSED: u8 = 2;

/// A page rendered and parsed during one crawl
struct CrawledPage {
    rendered: RenderedPage,
    parsed: ParsedDocument,
}

/// Fetches, stores and scores package documentation
pub struct DocsFetcher<R, S, P = NoOpProgress> {
    config: FetcherConfig,
    renderer: R,
    registry: S,
    progress: P,
    cache: CacheManager<FetchedDocs>,
    directories: DirectoryManager,
    validator: LinkValidator,
    scorer: DocumentationScorer,
    lifecycle: AtomicU8,
}

impl<R, S> DocsFetcher<R, S, NoOpProgress>
where
    R: PageRenderer,
    S: PackageInfoSource,
{
    /// Fetcher that reports no progress
    pub fn new(config: FetcherConfig, renderer: R, registry: S) -> FetchResult<Self> {
        Self::with_progress(config, renderer, registry, NoOpProgress)
    }
}

impl<R, S, P> DocsFetcher<R, S, P>
where
    R: PageRenderer,
    S: PackageInfoSource,
    P: ProgressReporter,
{
    pub fn with_progress(config: FetcherConfig, renderer: R, registry: S, progress: P) -> FetchResult<Self> {
        config.validate()?;

        let cache = CacheManager::new(
            config.cache_dir(),
            CacheOptions {
                ttl: config.cache_ttl(),
                max_size: config.cache_max_size_bytes(),
            },
        );
        let directories = DirectoryManager::new(config.packages_dir());
        let validator = LinkValidator::new(LinkValidationOptions {
            timeout: config.validation_timeout(),
            allowed_content_types: config.allowed_content_types().to_vec(),
        })?;
        let scorer = DocumentationScorer::new(config.scoring().clone());

        Ok(Self {
            config,
            renderer,
            registry,
            progress,
            cache,
            directories,
            validator,
            scorer,
            lifecycle: AtomicU8::new(LIFECYCLE_IDLE),
        })
    }

    #[must_use]
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &CacheManager<FetchedDocs> {
        &self.cache
    }

    #[must_use]
    pub fn directories(&self) -> &DirectoryManager {
        &self.directories
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn registry(&self) -> &S {
        &self.registry
    }

    #[must_use]
    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Prepare the cache and packages directories. Idempotent; fails after
    /// [`Self::close`].
    pub async fn initialize(&self) -> FetchResult<()> {
        match self.lifecycle.load(Ordering::Acquire) {
            LIFECYCLE_INITIALIZED => return Ok(()),
            LIFECYCLE_CLOSED => {
                return Err(FetchError::new(ErrorCode::InitError, "Fetcher has been closed"));
            }
            _ => {}
        }

        self.cache.init().await?;
        self.directories.ensure_base().await?;

        // A concurrent close wins
        let _ = self.lifecycle.compare_exchange(
            LIFECYCLE_IDLE,
            LIFECYCLE_INITIALIZED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if self.lifecycle.load(Ordering::Acquire) == LIFECYCLE_CLOSED {
            return Err(FetchError::new(ErrorCode::InitError, "Fetcher has been closed"));
        }
        Ok(())
    }

    /// Release the renderer. Later fetches fail with [`ErrorCode::InitError`].
    pub async fn close(&self) -> FetchResult<()> {
        if self.lifecycle.swap(LIFECYCLE_CLOSED, Ordering::AcqRel) == LIFECYCLE_CLOSED {
            return Ok(());
        }
        self.renderer.close().await
    }

    /// Fetch documentation for one package.
    ///
    /// Returns cached documentation unless `force` is set or the entry is
    /// missing or expired. Otherwise resolves the entry URL, crawls up to
    /// `max_pages` documentation pages on its domain, stores them through
    /// the directory manager and caches the result under the package name.
    pub async fn fetch_docs(&self, package: &str, force: bool) -> FetchResult<FetchOutcome> {
        let package = package.trim();
        if package.is_empty() {
            return Err(FetchError::new(ErrorCode::InvalidInput, "Package name is empty"));
        }

        self.initialize().await?;
        self.progress.report_state(package, FetchState::Initialized);

        match self.run(package, force).await {
            Ok(outcome) => {
                self.progress.report_state(package, FetchState::Closed);
                Ok(outcome)
            }
            Err(e) => {
                self.progress.report_state(package, FetchState::Failed);
                self.progress.report_error(package, &e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch several packages, `limit` at a time.
    ///
    /// Each batch runs to completion before the next starts. A failing
    /// package never stops the others; its error is recorded in the report.
    /// Duplicate names are fetched once.
    pub async fn fetch_docs_for_packages(&self, packages: &[String], limit: usize, force: bool) -> BatchReport {
        let mut seen = HashSet::new();
        let unique: Vec<String> = packages
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();

        let mut report = BatchReport::default();
        for (batch, chunk) in unique.chunks(limit.max(1)).enumerate() {
            self.progress.report_batch_started(batch, chunk);

            let results = join_all(chunk.iter().map(|name| self.fetch_docs(name, force))).await;
            for (name, result) in chunk.iter().zip(results) {
                match result {
                    Ok(outcome) => report.succeeded.push(outcome),
                    Err(e) => report.failed.push((name.clone(), e)),
                }
            }

            self.progress.report_batch_completed(batch);
        }
        report
    }

    /// Fetch (cache-aware) and score one package's entry page
    pub async fn score_documentation(&self, package: &str) -> FetchResult<DocumentationScore> {
        let outcome = self.fetch_docs(package, false).await?;
        let docs = &outcome.docs;

        let validation = self.validator.validate_link(&docs.url).await;
        Ok(self.scorer.score_documentation(&docs.url, &docs.html, &validation))
    }

    async fn run(&self, package: &str, force: bool) -> FetchResult<FetchOutcome> {
        if !force {
            match self.cache.get(package).await {
                Ok(Some(docs)) => {
                    self.progress.report_cache_hit(package);
                    return Ok(FetchOutcome {
                        docs,
                        from_cache: true,
                        package_dir: self.directories.package_dir(package),
                    });
                }
                Ok(None) => {}
                Err(e) => self
                    .progress
                    .report_warning(package, &format!("Ignoring unreadable cache entry: {e}")),
            }
        }

        self.progress.report_state(package, FetchState::Resolving);
        let target = self.resolve(package).await?;

        self.progress.report_state(package, FetchState::Crawling);
        let pages = self.crawl(&target).await?;

        self.progress.report_state(package, FetchState::Parsing);
        let docs = build_docs(package, &pages)?;

        self.progress.report_state(package, FetchState::Persisting);
        let package_dir = self.persist(package, &pages, &docs).await?;

        self.progress.report_completed(package, pages.len());
        Ok(FetchOutcome {
            docs,
            from_cache: false,
            package_dir,
        })
    }

    async fn resolve(&self, package: &str) -> FetchResult<PackageDocsTarget> {
        let ResolvedUrl { url, source } = resolve_docs_url(package, &self.registry).await?;
        self.progress.report_url_resolved(package, &url, source);

        let host = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .ok_or_else(|| {
                FetchError::new(
                    ErrorCode::DocsNotFound,
                    format!("No usable documentation URL for {package}: {url}"),
                )
            })?;

        Ok(PackageDocsTarget {
            name: package.to_string(),
            resolved_url: Some(url),
            allowed_domains: BTreeSet::from([host]),
            max_depth: self.config.max_pages(),
        })
    }

    /// Render the entry page, then documentation links FIFO until the page
    /// budget is spent. Only the entry page is required to succeed.
    async fn crawl(&self, target: &PackageDocsTarget) -> FetchResult<Vec<CrawledPage>> {
        let package = target.name.as_str();
        let seed = target.resolved_url.as_deref().unwrap_or_default();

        let mut urls = UrlManager::new(
            seed,
            UrlManagerOptions {
                allowed_domains: target.allowed_domains.iter().cloned().collect(),
                max_depth: target.max_depth,
            },
        );
        let mut pages: Vec<CrawledPage> = Vec::new();

        while urls.visited_count() < target.max_depth {
            let Some(entry) = urls.get_next() else {
                break;
            };
            let is_seed = pages.is_empty();

            let rendered = match retry(self.config.retry(), "page render", || self.renderer.navigate(&entry.url)).await {
                Ok(rendered) => rendered,
                Err(e) if is_seed => {
                    return Err(FetchError::wrap(
                        ErrorCode::DocsFetchError,
                        format!("Failed to render {}", entry.url),
                        e,
                    ));
                }
                Err(e) => {
                    self.progress
                        .report_warning(package, &format!("Skipping {}: {e}", entry.url));
                    continue;
                }
            };
            self.progress.report_page_rendered(package, &rendered.url);

            let parsed = match parse_html(&rendered.html) {
                Ok(parsed) => parsed,
                Err(e) if is_seed => {
                    return Err(FetchError::wrap(
                        ErrorCode::DocsParseError,
                        format!("Failed to parse {}", entry.url),
                        e,
                    ));
                }
                Err(e) => {
                    self.progress
                        .report_warning(package, &format!("Skipping unparseable {}: {e}", entry.url));
                    continue;
                }
            };

            let base = url::Url::parse(&rendered.url)
                .or_else(|_| url::Url::parse(&entry.url))
                .ok();
            for link in &parsed.links {
                let absolute = normalize_url(link, base.as_ref());
                if !absolute.is_empty() && is_documentation_url(&absolute) {
                    urls.add_discovered(&absolute, entry.depth + 1);
                }
            }

            pages.push(CrawledPage { rendered, parsed });
        }

        if pages.is_empty() {
            return Err(FetchError::new(
                ErrorCode::DocsNotFound,
                format!("Nothing to crawl for {package}"),
            ));
        }
        Ok(pages)
    }

    async fn persist(&self, package: &str, pages: &[CrawledPage], docs: &FetchedDocs) -> FetchResult<PathBuf> {
        let fetched_at = docs.fetched_at;
        let saved: Vec<SavedPage> = pages
            .iter()
            .map(|page| SavedPage {
                record: PageRecord {
                    url: page.rendered.url.clone(),
                    title: page_title(page),
                    content: page.parsed.main_content.clone(),
                    links: page.parsed.links.clone(),
                    fetched_at,
                },
                html: page.rendered.html.clone(),
            })
            .collect();

        let mut saved = saved.into_iter();
        let Some(main) = saved.next() else {
            return Err(FetchError::new(ErrorCode::DocsNotFound, format!("No pages for {package}")));
        };
        let mut artifacts = PackageArtifacts::new(main);
        artifacts.pages = saved.collect();

        if self.config.download_assets() {
            let assets = &pages[0].rendered.assets;
            artifacts.stylesheets = self.download_assets(package, &assets.stylesheets).await;
            artifacts.images = self.download_assets(package, &assets.images).await;
        }

        // Files stay hidden until the cache write has gone through
        let staged = self.directories.stage_package(package, &artifacts).await?;

        let cached = match self.cache.set_new(package, docs).await {
            Ok(()) => true,
            Err(e) if e.code() == ErrorCode::CacheSizeError => {
                self.progress.report_warning(package, &format!("Not cached: {e}"));
                false
            }
            Err(e) => {
                staged.discard().await;
                return Err(e);
            }
        };

        match staged.commit().await {
            Ok(package_dir) => Ok(package_dir),
            Err(e) => {
                if cached && let Err(delete) = self.cache.delete(package).await {
                    self.progress
                        .report_warning(package, &format!("Failed to drop cache entry: {delete}"));
                }
                Err(e)
            }
        }
    }

    /// Download up to `max_assets_per_kind` of `urls`; failures are reported
    /// and skipped
    async fn download_assets(&self, package: &str, urls: &[String]) -> Vec<Asset> {
        let mut seen = HashSet::new();
        let wanted: Vec<&String> = urls
            .iter()
            .filter(|url| seen.insert(url.as_str()))
            .take(self.config.max_assets_per_kind())
            .collect();

        let results = join_all(wanted.iter().map(|url| self.renderer.fetch_subresource(url))).await;

        wanted
            .into_iter()
            .zip(results)
            .filter_map(|(url, result)| match result {
                Ok(bytes) => Some(Asset {
                    url: url.clone(),
                    bytes,
                }),
                Err(e) => {
                    self.progress
                        .report_warning(package, &format!("Skipping asset {url}: {e}"));
                    None
                }
            })
            .collect()
    }
}

fn page_title(page: &CrawledPage) -> String {
    if page.rendered.title.trim().is_empty() {
        page.parsed.title.clone()
    } else {
        page.rendered.title.trim().to_string()
    }
}

fn build_docs(package: &str, pages: &[CrawledPage]) -> FetchResult<FetchedDocs> {
    let Some(entry) = pages.first() else {
        return Err(FetchError::new(ErrorCode::DocsNotFound, format!("No pages for {package}")));
    };

    if entry.parsed.main_content.trim().is_empty() {
        return Err(FetchError::new(
            ErrorCode::DocsNotFound,
            format!("{} has no readable content", entry.rendered.url),
        ));
    }

    Ok(FetchedDocs {
        package: package.to_string(),
        url: entry.rendered.url.clone(),
        title: page_title(entry),
        html: entry.rendered.html.clone(),
        content: entry.parsed.main_content.clone(),
        description: entry.parsed.description.clone(),
        links: entry.parsed.links.clone(),
        pages: pages
            .iter()
            .map(|page| PageSummary {
                url: page.rendered.url.clone(),
                title: page_title(page),
            })
            .collect(),
        fetched_at: Utc::now(),
    })
}

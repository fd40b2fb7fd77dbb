pub mod cache;
pub mod config;
pub mod content_saver;
pub mod errors;
pub mod fetcher;
pub mod link_validator;
pub mod page_extractor;
pub mod registry;
pub mod renderer;
pub mod runtime;
pub mod scoring;
pub mod url_manager;
pub mod utils;

pub use cache::{CacheEntry, CacheManager, CacheOptions, CacheStats};
pub use config::FetcherConfig;
pub use content_saver::DirectoryManager;
pub use errors::{ErrorCode, FetchError, FetchResult};
pub use fetcher::{
    BatchReport, DocsFetcher, FetchOutcome, FetchState, FetchedDocs, LogProgress, NoOpProgress,
    ProgressReporter,
};
pub use link_validator::{LinkValidationResult, LinkValidator};
pub use page_extractor::{ParsedDocument, parse_html};
pub use registry::{NpmRegistry, PackageInfo, PackageInfoSource};
pub use renderer::{ChromiumRenderer, PageRenderer};
pub use scoring::{DocumentationScore, DocumentationScorer};
pub use url_manager::{UrlManager, is_documentation_url};

/// Fetcher backed by a headless Chrome and the configured npm registry
pub type BrowserFetcher<P = LogProgress> = DocsFetcher<ChromiumRenderer, NpmRegistry, P>;

/// Launch a browser and build an initialized [`BrowserFetcher`].
///
/// The caller owns the browser through the fetcher and must call
/// [`DocsFetcher::close`] when done.
pub async fn open_fetcher<P: ProgressReporter>(config: FetcherConfig, progress: P) -> FetchResult<BrowserFetcher<P>> {
    config.validate()?;
    let registry = NpmRegistry::from_config(&config)?;
    let renderer = ChromiumRenderer::launch(&config).await?;

    // Dropping the renderer on failure tears the browser down
    let fetcher = DocsFetcher::with_progress(config, renderer, registry, progress)?;
    if let Err(e) = fetcher.initialize().await {
        let _ = fetcher.close().await;
        return Err(e);
    }
    Ok(fetcher)
}

/// Fetch one package's documentation with a throwaway browser
pub async fn fetch_package_docs(config: FetcherConfig, package: &str, force: bool) -> FetchResult<FetchOutcome> {
    let fetcher = open_fetcher(config, LogProgress).await?;
    let result = fetcher.fetch_docs(package, force).await;
    let closed = fetcher.close().await;
    let outcome = result?;
    closed?;
    Ok(outcome)
}

//! Orchestrator tests against a scripted renderer and registry

mod common;

use common::{MockRegistry, MockRenderer, RecordingProgress, create_docs_html, create_test_html, test_config};
use docs_fetcher::errors::ErrorCode;
use docs_fetcher::fetcher::DocsFetcher;
use docs_fetcher::renderer::PageAssets;
use tempfile::TempDir;

const SEED: &str = "https://widget.dev/docs";

fn widget_site() -> MockRenderer {
    MockRenderer::new()
        .page(
            SEED,
            &create_docs_html(
                "widget",
                &["/docs/install", "/docs/api", "/blog/news", "https://other.org/docs/x", "#top"],
            ),
        )
        .page("https://widget.dev/docs/install", &create_docs_html("install", &["/docs/api"]))
        .page("https://widget.dev/docs/api", &create_docs_html("api", &[]))
}

fn widget_registry() -> MockRegistry {
    MockRegistry::new().with_homepage("widget", "https://widget.dev/docs/")
}

#[tokio::test]
async fn fetch_crawls_documentation_links_and_stores_package() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::new(test_config(temp.path()), widget_site(), widget_registry()).unwrap();

    let outcome = fetcher.fetch_docs("widget", false).await.unwrap();

    assert!(!outcome.from_cache);
    assert_eq!(outcome.docs.url, SEED);
    assert_eq!(outcome.docs.title, "widget");
    assert_eq!(outcome.docs.description, "widget documentation");
    assert!(outcome.docs.content.contains("install the library"));
    assert_eq!(
        fetcher.renderer().navigations(),
        vec![
            SEED.to_string(),
            "https://widget.dev/docs/install".to_string(),
            "https://widget.dev/docs/api".to_string(),
        ]
    );
    assert_eq!(outcome.docs.pages.len(), 3);

    let dir = &outcome.package_dir;
    assert!(dir.join("index.html").is_file());
    assert!(dir.join("metadata.json").is_file());
    let html_files = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .count();
    assert_eq!(html_files, 3);

    let record = fetcher.directories().load_metadata("widget").await.unwrap().unwrap();
    assert_eq!(record.url, SEED);
    assert_eq!(record.title, "widget");
}

#[tokio::test]
async fn second_fetch_is_served_from_cache() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        widget_site(),
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();

    let first = fetcher.fetch_docs("widget", false).await.unwrap();
    let second = fetcher.fetch_docs("widget", false).await.unwrap();

    assert!(second.from_cache);
    assert_eq!(second.docs, first.docs);
    assert_eq!(second.package_dir, first.package_dir);
    assert_eq!(fetcher.renderer().navigation_count(SEED), 1);
    assert_eq!(fetcher.registry().lookups(), 1);
    assert!(fetcher.progress().events().contains(&"cache-hit widget".to_string()));
}

#[tokio::test]
async fn force_bypasses_cache() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::new(test_config(temp.path()), widget_site(), widget_registry()).unwrap();

    fetcher.fetch_docs("widget", false).await.unwrap();
    let forced = fetcher.fetch_docs("widget", true).await.unwrap();

    assert!(!forced.from_cache);
    assert_eq!(fetcher.renderer().navigation_count(SEED), 2);
}

#[tokio::test]
async fn lifecycle_states_are_reported_in_order() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        widget_site(),
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();

    fetcher.fetch_docs("widget", false).await.unwrap();
    assert_eq!(
        fetcher.progress().states("widget"),
        vec!["initialized", "resolving", "crawling", "parsing", "persisting", "closed"]
    );

    fetcher.fetch_docs("widget", false).await.unwrap();
    let states = fetcher.progress().states("widget");
    assert_eq!(&states[6..], ["initialized", "closed"]);
}

#[tokio::test]
async fn failing_secondary_page_is_skipped_after_retries() {
    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new()
        .page(SEED, &create_docs_html("widget", &["/docs/broken", "/docs/api"]))
        .failing("https://widget.dev/docs/broken", ErrorCode::NetworkError)
        .page("https://widget.dev/docs/api", &create_docs_html("api", &[]));
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        renderer,
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();

    let outcome = fetcher.fetch_docs("widget", false).await.unwrap();

    // Two attempts under the test retry policy
    assert_eq!(fetcher.renderer().navigation_count("https://widget.dev/docs/broken"), 2);
    assert_eq!(outcome.docs.pages.len(), 2);
    assert!(
        fetcher
            .progress()
            .events()
            .iter()
            .any(|e| e.starts_with("warning widget Skipping https://widget.dev/docs/broken"))
    );
}

#[tokio::test]
async fn seed_failure_fails_the_fetch_and_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new().failing(SEED, ErrorCode::Timeout);
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        renderer,
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();

    let err = fetcher.fetch_docs("widget", false).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::DocsFetchError);
    assert_eq!(fetcher.progress().states("widget").last().map(String::as_str), Some("failed"));
    assert!(!fetcher.directories().package_dir("widget").exists());
    assert!(fetcher.directories().list_packages().await.unwrap().is_empty());
    assert!(!fetcher.cache().has("widget").await.unwrap());
}

/// Turn the cache directory into a plain file so every cache write fails
fn break_cache_dir(fetcher: &DocsFetcher<MockRenderer, MockRegistry, RecordingProgress>) {
    let cache_dir = fetcher.config().cache_dir();
    std::fs::remove_dir_all(&cache_dir).unwrap();
    std::fs::write(&cache_dir, b"not a directory").unwrap();
}

#[tokio::test]
async fn failed_cache_write_leaves_no_package_directory() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        widget_site(),
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();
    fetcher.initialize().await.unwrap();
    break_cache_dir(&fetcher);

    let err = fetcher.fetch_docs("widget", false).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::CacheSetError);
    assert!(!fetcher.directories().package_dir("widget").exists());
    assert_eq!(std::fs::read_dir(fetcher.directories().base()).unwrap().count(), 0);
}

#[tokio::test]
async fn failed_cache_write_keeps_previous_package_contents() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        widget_site(),
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();
    let first = fetcher.fetch_docs("widget", false).await.unwrap();
    let before = std::fs::read(first.package_dir.join("metadata.json")).unwrap();
    break_cache_dir(&fetcher);

    let err = fetcher.fetch_docs("widget", true).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::CacheSetError);
    assert_eq!(std::fs::read(first.package_dir.join("metadata.json")).unwrap(), before);
    assert_eq!(
        fetcher.directories().list_packages().await.unwrap(),
        vec!["widget".to_string()]
    );
    assert_eq!(std::fs::read_dir(fetcher.directories().base()).unwrap().count(), 1);
}

#[tokio::test]
async fn page_without_readable_content_is_not_documentation() {
    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new().page(SEED, &create_test_html("widget", "<script>render()</script>"));
    let fetcher = DocsFetcher::new(test_config(temp.path()), renderer, widget_registry()).unwrap();

    let err = fetcher.fetch_docs("widget", false).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocsNotFound);
}

#[tokio::test]
async fn unknown_package_is_reported_as_not_found() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::new(test_config(temp.path()), MockRenderer::new(), MockRegistry::new()).unwrap();

    let err = fetcher.fetch_docs("no-such-package", false).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PackageNotFound);
    assert!(fetcher.renderer().navigations().is_empty());
}

#[tokio::test]
async fn empty_package_name_is_invalid_input() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::new(test_config(temp.path()), MockRenderer::new(), MockRegistry::new()).unwrap();

    let err = fetcher.fetch_docs("   ", false).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
}

#[tokio::test]
async fn known_packages_skip_the_registry() {
    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new().page(
        "https://react.dev/reference/react",
        &create_docs_html("react", &[]),
    );
    let fetcher = DocsFetcher::new(test_config(temp.path()), renderer, MockRegistry::new()).unwrap();

    let outcome = fetcher.fetch_docs("react", false).await.unwrap();

    assert_eq!(outcome.docs.url, "https://react.dev/reference/react");
    assert_eq!(fetcher.registry().lookups(), 0);
    let cached = fetcher.cache().get("react").await.unwrap();
    assert_eq!(cached, Some(outcome.docs));
}

#[tokio::test]
async fn registry_outage_falls_back_to_package_index() {
    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new().page(
        "https://www.npmjs.com/package/flaky",
        &create_docs_html("flaky", &[]),
    );
    let registry = MockRegistry::new().failing("flaky", ErrorCode::NetworkError);
    let fetcher = DocsFetcher::new(test_config(temp.path()), renderer, registry).unwrap();

    let outcome = fetcher.fetch_docs("flaky", false).await.unwrap();
    assert_eq!(outcome.docs.url, "https://www.npmjs.com/package/flaky");
}

#[tokio::test]
async fn seed_page_assets_are_downloaded() {
    let temp = TempDir::new().unwrap();
    let assets = PageAssets {
        stylesheets: vec![
            "https://widget.dev/style.css".to_string(),
            "https://widget.dev/missing.css".to_string(),
        ],
        images: vec!["https://widget.dev/logo.png".to_string()],
    };
    let renderer = MockRenderer::new()
        .page_with_assets(SEED, &create_docs_html("widget", &[]), assets)
        .asset("https://widget.dev/style.css", b"body { margin: 0 }")
        .asset("https://widget.dev/logo.png", b"\x89PNG");
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        renderer,
        widget_registry(),
        RecordingProgress::default(),
    )
    .unwrap();

    let outcome = fetcher.fetch_docs("widget", false).await.unwrap();

    let css: Vec<_> = std::fs::read_dir(outcome.package_dir.join("css")).unwrap().collect();
    let images: Vec<_> = std::fs::read_dir(outcome.package_dir.join("images")).unwrap().collect();
    assert_eq!(css.len(), 1);
    assert_eq!(images.len(), 1);
    assert!(
        fetcher
            .progress()
            .events()
            .iter()
            .any(|e| e.contains("missing.css"))
    );
}

#[tokio::test]
async fn batch_isolates_failures_and_runs_batches_in_order() {
    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new()
        .page("https://alpha.dev/docs", &create_docs_html("alpha", &[]))
        .page("https://beta.dev/docs", &create_docs_html("beta", &[]))
        .failing("https://gamma.dev/docs", ErrorCode::InvalidData);
    let registry = MockRegistry::new()
        .with_homepage("alpha", "https://alpha.dev/docs")
        .with_homepage("beta", "https://beta.dev/docs")
        .with_homepage("gamma", "https://gamma.dev/docs");
    let fetcher = DocsFetcher::with_progress(
        test_config(temp.path()),
        renderer,
        registry,
        RecordingProgress::default(),
    )
    .unwrap();

    let names: Vec<String> = ["alpha", "beta", "alpha", "gamma"].iter().map(|s| s.to_string()).collect();
    let report = fetcher.fetch_docs_for_packages(&names, 2, false).await;

    assert_eq!(report.total(), 3);
    assert!(!report.is_success());
    let succeeded: Vec<&str> = report.succeeded.iter().map(|o| o.docs.package.as_str()).collect();
    assert_eq!(succeeded, vec!["alpha", "beta"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "gamma");

    let batch_events: Vec<String> = fetcher
        .progress()
        .events()
        .into_iter()
        .filter(|e| e.starts_with("batch-"))
        .collect();
    assert_eq!(
        batch_events,
        vec![
            "batch-started 0 alpha,beta",
            "batch-completed 0",
            "batch-started 1 gamma",
            "batch-completed 1",
        ]
    );

    let err = report.into_result().unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocsProcessingError);
    assert!(err.message().contains("gamma"));
}

#[tokio::test]
async fn closed_fetcher_rejects_work() {
    let temp = TempDir::new().unwrap();
    let fetcher = DocsFetcher::new(test_config(temp.path()), widget_site(), widget_registry()).unwrap();

    fetcher.initialize().await.unwrap();
    fetcher.close().await.unwrap();
    fetcher.close().await.unwrap();

    assert_eq!(fetcher.renderer().close_count(), 1);
    let err = fetcher.fetch_docs("widget", false).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InitError);
}

#[tokio::test]
async fn score_documentation_validates_and_scores_entry_page() {
    let mut server = mockito::Server::new_async().await;
    let docs_url = common::test_url(&server, "/docs");
    let head = server
        .mock("HEAD", "/docs")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let renderer = MockRenderer::new().page(&docs_url, &create_docs_html("widget", &[]));
    let registry = MockRegistry::new().with_homepage("widget", &docs_url);
    let fetcher = DocsFetcher::new(test_config(temp.path()), renderer, registry).unwrap();

    let score = fetcher.score_documentation("widget").await.unwrap();

    head.assert_async().await;
    assert_eq!(score.url, docs_url);
    assert!(score.score > 0.0 && score.score <= 1.0);
    assert_eq!(score.details.detected_language, "en");
    assert_eq!(score.details.code_block_count, 1);
}

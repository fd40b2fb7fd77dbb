// Command line front end for docs_fetcher.
//
// `fetch` renders and stores package documentation, `score` rates a
// package's entry page, `cache` inspects and maintains the response cache.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use docs_fetcher::cache::{CacheManager, CacheOptions};
use docs_fetcher::{BrowserFetcher, FetchedDocs, FetcherConfig, LogProgress, open_fetcher};
use env_logger::Env;
use log::LevelFilter;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "docs-fetcher", version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(long, short = 'c', value_name = "PATH", global = true, env = "DOCS_FETCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch documentation for one package, or for every package in a manifest
    Fetch {
        /// Package name
        #[arg(conflicts_with = "all")]
        package: Option<String>,

        /// Ignore cached documentation and fetch again
        #[arg(long)]
        force: bool,

        /// Packages fetched concurrently [default: from config, 15]
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Fetch every dependency listed in the manifest
        #[arg(long)]
        all: bool,

        /// package.json read by --all
        #[arg(long, value_name = "PATH", default_value = "package.json", requires = "all")]
        manifest: PathBuf,
    },

    /// Score a package's documentation entry page
    Score {
        package: String,
    },

    /// Inspect or maintain the documentation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum CacheAction {
    /// Entry count, total size and hit/miss counters
    Stats,
    /// What is on disk under the cache directory
    Info,
    /// Remove expired entries
    Cleanup,
    /// Remove every entry
    Clear,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .filter_module("chromiumoxide::handler", LevelFilter::Off)
        .filter_module("chromiumoxide::conn", LevelFilter::Off)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FetcherConfig> {
    match path {
        Some(path) => Ok(FetcherConfig::load(path)?),
        None => Ok(FetcherConfig::default()),
    }
}

/// Union of `dependencies` and `devDependencies`, sorted
fn manifest_packages(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

    let mut names = BTreeSet::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = manifest.get(section).and_then(serde_json::Value::as_object) {
            names.extend(deps.keys().cloned());
        }
    }
    Ok(names.into_iter().collect())
}

async fn fetch(
    fetcher: &BrowserFetcher,
    packages: Vec<String>,
    limit: usize,
    force: bool,
) -> Result<()> {
    if let [package] = packages.as_slice() {
        let outcome = fetcher.fetch_docs(package, force).await?;
        let source = if outcome.from_cache { "cache" } else { "fetched" };
        println!(
            "{} ({source}): {} -> {}",
            outcome.docs.package,
            outcome.docs.url,
            outcome.package_dir.display()
        );
        return Ok(());
    }

    let report = fetcher.fetch_docs_for_packages(&packages, limit, force).await;
    for outcome in &report.succeeded {
        println!("{}: {}", outcome.docs.package, outcome.package_dir.display());
    }
    for (package, error) in &report.failed {
        eprintln!("{package}: {error}");
    }
    report.into_result()?;
    Ok(())
}

async fn score(fetcher: &BrowserFetcher, package: &str) -> Result<()> {
    let score = fetcher.score_documentation(package).await?;
    let details = &score.details;

    println!("{}: {:.3}", score.url, score.score);
    println!("  freshness    {:.3}", details.freshness);
    println!("  size         {:.3}", details.size);
    println!("  language     {:.3} ({})", details.language, details.detected_language);
    println!("  readability  {:.3}", details.readability);
    println!("  completeness {:.3}", details.completeness);
    println!(
        "  {} words, {} headings, {} code blocks",
        details.word_count, details.heading_count, details.code_block_count
    );
    Ok(())
}

async fn cache(config: &FetcherConfig, action: CacheAction) -> Result<()> {
    let cache: CacheManager<FetchedDocs> = CacheManager::new(
        config.cache_dir(),
        CacheOptions {
            ttl: config.cache_ttl(),
            max_size: config.cache_max_size_bytes(),
        },
    );

    match action {
        CacheAction::Stats => {
            let stats = cache.get_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        CacheAction::Info => {
            let info = cache.get_directory_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        CacheAction::Cleanup => {
            let removed = cache.cleanup().await?;
            println!("Removed {removed} expired entr{}", if removed == 1 { "y" } else { "ies" });
        }
        CacheAction::Clear => {
            cache.clear().await?;
            println!("Cache cleared: {}", cache.dir().display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Cache { action } => cache(&config, action).await,
        Command::Fetch {
            package,
            force,
            limit,
            all,
            manifest,
        } => {
            let packages = match package {
                Some(package) if !package.trim().is_empty() => vec![package],
                _ if all => manifest_packages(&manifest)?,
                _ => bail!("Missing package name"),
            };
            if packages.is_empty() {
                bail!("No dependencies listed in {}", manifest.display());
            }
            let limit = limit.unwrap_or_else(|| config.batch_limit());

            let fetcher = open_fetcher(config, LogProgress).await?;
            let result = fetch(&fetcher, packages, limit, force).await;
            fetcher.close().await?;
            result
        }
        Command::Score { package } => {
            let fetcher = open_fetcher(config, LogProgress).await?;
            let result = score(&fetcher, &package).await;
            fetcher.close().await?;
            result
        }
    }
}

//! Locating, downloading and launching Chrome

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;
use tracing::{error, info, trace, warn};

use super::cleanup::LaunchedBrowser;
use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::utils::CHROME_USER_AGENT;

/// Environment variable pointing at a Chrome/Chromium executable
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

fn candidate_paths() -> Vec<PathBuf> {
    let raw: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    let mut paths: Vec<PathBuf> = raw.iter().map(PathBuf::from).collect();
    if cfg!(target_os = "windows")
        && let Some(local) = dirs::data_local_dir()
    {
        paths.push(local.join(r"Google\Chrome\Application\chrome.exe"));
    }
    paths
}

/// Find a Chrome/Chromium executable: `$CHROMIUM_PATH` first, then the
/// usual install locations for this platform
pub fn find_browser_executable() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from {CHROMIUM_PATH_ENV}: {}", path.display());
            return Some(path);
        }
        warn!("{CHROMIUM_PATH_ENV} points to missing file: {}", path.display());
    }

    let found = candidate_paths().into_iter().find(|p| p.exists());
    match &found {
        Some(path) => info!("Found browser at: {}", path.display()),
        None => warn!("No Chrome/Chromium executable found"),
    }
    found
}

/// Download a Chromium build into `<cache_root>/chromium` and return its executable
pub async fn download_managed_browser(cache_root: &Path) -> FetchResult<PathBuf> {
    let install_dir = cache_root.join("chromium");
    info!("Downloading managed Chromium into {}", install_dir.display());

    tokio::fs::create_dir_all(&install_dir).await.map_err(|e| {
        FetchError::wrap(
            ErrorCode::InitError,
            format!("Failed to create {}", install_dir.display()),
            e,
        )
    })?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&install_dir)
        .build()
        .map_err(|e| FetchError::new(ErrorCode::InitError, format!("Invalid fetcher options: {e}")))?;

    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| FetchError::new(ErrorCode::InitError, format!("Failed to download Chromium: {e}")))?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Launch Chrome with a fresh profile directory.
///
/// Uses a local install when one exists, otherwise downloads Chromium into
/// `cache_root`. The CDP handler runs on its own task, tracked by the
/// returned [`LaunchedBrowser`].
pub async fn launch_browser(headless: bool, cache_root: &Path) -> FetchResult<LaunchedBrowser> {
    let chrome_path = match find_browser_executable() {
        Some(path) => path,
        None => download_managed_browser(cache_root).await?,
    };

    let user_data_dir = std::env::temp_dir().join(format!(
        "docs_fetcher_chrome_{}_{}",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ));
    tokio::fs::create_dir_all(&user_data_dir).await.map_err(|e| {
        FetchError::wrap(ErrorCode::InitError, "Failed to create browser profile directory", e)
    })?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path);

    builder = if headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let browser_config = builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-features=TranslateUI")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .build()
        .map_err(|e| FetchError::new(ErrorCode::InitError, format!("Failed to build browser config: {e}")))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| FetchError::new(ErrorCode::InitError, format!("Failed to launch browser: {e}")))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide does not know every CDP event Chrome sends
                let benign = message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");
                if benign {
                    trace!("Suppressed CDP deserialization error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    });

    info!("Browser launched with profile {}", user_data_dir.display());
    Ok(LaunchedBrowser::new(browser, handler_task, user_data_dir))
}

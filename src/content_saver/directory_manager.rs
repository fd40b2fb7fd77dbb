//! Package name → directory mapping and artifact persistence
//!
//! Layout of one package directory:
//!
//! ```text
//! <packages>/<sanitized name>/
//!     index.html          main page
//!     metadata.json       {url, title, content, links, fetchedAt}
//!     <host>_<path>.html  further crawled pages
//!     <host>_<path>.json
//!     css/                stylesheets
//!     images/             images
//! ```
//!
//! A save is staged in a sibling directory and renamed into place, so a
//! failed save leaves the previous contents (or nothing) behind. Callers
//! that must finish other writes first use [`DirectoryManager::stage_package`]
//! and commit afterwards.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use super::records::{Asset, PackageArtifacts, PageRecord, SavedPage, asset_file_name};
use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::utils::{MAIN_ARTIFACT_FILE, METADATA_FILE, sanitize_package_name, url_to_filename};

/// Prefix of in-progress save directories
const STAGING_PREFIX: &str = ".staging-";

/// Prefix of directories being replaced
const RETIRED_PREFIX: &str = ".retired-";

/// Owns the packages root directory
#[derive(Debug, Clone)]
pub struct DirectoryManager {
    base: PathBuf,
}

impl DirectoryManager {
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory for `name`, sanitized
    #[must_use]
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.base.join(sanitize_package_name(name))
    }

    /// Create the packages root
    pub async fn ensure_base(&self) -> FetchResult<()> {
        tokio::fs::create_dir_all(&self.base).await.map_err(|e| {
            FetchError::wrap(
                ErrorCode::DirectoryError,
                format!("Failed to create {}", self.base.display()),
                e,
            )
        })
    }

    /// Write every artifact for `name`, replacing what was there.
    ///
    /// Returns the package directory. On error nothing of this save remains.
    pub async fn save_package(&self, name: &str, artifacts: &PackageArtifacts) -> FetchResult<PathBuf> {
        self.stage_package(name, artifacts).await?.commit().await
    }

    /// Write every artifact for `name` into a hidden staging directory.
    ///
    /// Nothing is visible under the package directory until
    /// [`StagedPackage::commit`] runs.
    pub async fn stage_package(&self, name: &str, artifacts: &PackageArtifacts) -> FetchResult<StagedPackage> {
        self.ensure_base().await?;

        let sanitized = sanitize_package_name(name);
        let staging = self
            .base
            .join(format!("{STAGING_PREFIX}{sanitized}-{}", uuid::Uuid::new_v4()));

        if let Err(e) = write_artifacts(&staging, artifacts).await {
            remove_dir_quietly(&staging).await;
            return Err(e);
        }

        debug!(
            target: "docs_fetcher::storage",
            "Staged {} page(s), {} stylesheet(s), {} image(s) for {name}",
            1 + artifacts.pages.len(),
            artifacts.stylesheets.len(),
            artifacts.images.len()
        );
        Ok(StagedPackage {
            base: self.base.clone(),
            staging,
            target: self.package_dir(name),
            sanitized,
        })
    }

    /// Main page record of `name`, if it was saved
    pub async fn load_metadata(&self, name: &str) -> FetchResult<Option<PageRecord>> {
        let path = self.package_dir(name).join(METADATA_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FetchError::wrap(
                    ErrorCode::FileReadError,
                    format!("Failed to read {}", path.display()),
                    e,
                ));
            }
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            FetchError::wrap(
                ErrorCode::InvalidData,
                format!("Invalid metadata in {}", path.display()),
                e,
            )
        })
    }

    /// Directory names of saved packages, sorted
    pub async fn list_packages(&self) -> FetchResult<Vec<String>> {
        let list_error = |e: std::io::Error| {
            FetchError::wrap(
                ErrorCode::DirectoryError,
                format!("Failed to list {}", self.base.display()),
                e,
            )
        };

        let mut entries = match tokio::fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_error(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if entry.file_type().await.map_err(list_error)?.is_dir() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete everything stored for `name`. Returns whether anything existed.
    pub async fn remove_package(&self, name: &str) -> FetchResult<bool> {
        let dir = self.package_dir(name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FetchError::wrap(
                ErrorCode::DirectoryError,
                format!("Failed to remove {}", dir.display()),
                e,
            )),
        }
    }
}

/// A fully written package that is not yet visible.
///
/// Either [`commit`](Self::commit) or [`discard`](Self::discard) it; a
/// dropped value leaves its hidden staging directory behind.
#[derive(Debug)]
#[must_use = "a staged package is invisible until committed"]
pub struct StagedPackage {
    base: PathBuf,
    staging: PathBuf,
    target: PathBuf,
    sanitized: String,
}

impl StagedPackage {
    /// Package directory the commit will replace
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Swap the staged directory into place, replacing any previous save
    pub async fn commit(self) -> FetchResult<PathBuf> {
        if let Err(e) = swap_into_place(&self.base, &self.staging, &self.target, &self.sanitized).await {
            remove_dir_quietly(&self.staging).await;
            return Err(e);
        }

        info!(target: "docs_fetcher::storage", "Saved package into {}", self.target.display());
        Ok(self.target)
    }

    /// Throw the staged files away; the previous save stays untouched
    pub async fn discard(self) {
        debug!(target: "docs_fetcher::storage", "Discarding staged {}", self.staging.display());
        remove_dir_quietly(&self.staging).await;
    }
}

async fn write_artifacts(dir: &Path, artifacts: &PackageArtifacts) -> FetchResult<()> {
    create_dir(dir).await?;

    write_page(dir, MAIN_ARTIFACT_FILE, METADATA_FILE, &artifacts.main).await?;
    for page in &artifacts.pages {
        let html_name = url_to_filename(&page.record.url);
        let json_name = format!("{}.json", html_name.trim_end_matches(".html"));
        write_page(dir, &html_name, &json_name, page).await?;
    }

    write_assets(&dir.join("css"), &artifacts.stylesheets).await?;
    write_assets(&dir.join("images"), &artifacts.images).await
}

async fn write_page(dir: &Path, html_name: &str, json_name: &str, page: &SavedPage) -> FetchResult<()> {
    write_file(&dir.join(html_name), page.html.as_bytes()).await?;

    let record = serde_json::to_vec_pretty(&page.record).map_err(|e| {
        FetchError::wrap(
            ErrorCode::FileWriteError,
            format!("Failed to serialize record for {}", page.record.url),
            e,
        )
    })?;
    write_file(&dir.join(json_name), &record).await
}

async fn write_assets(dir: &Path, assets: &[Asset]) -> FetchResult<()> {
    if assets.is_empty() {
        return Ok(());
    }

    create_dir(dir).await?;
    for asset in assets {
        write_file(&dir.join(asset_file_name(&asset.url)), &asset.bytes).await?;
    }
    Ok(())
}

/// Rename `staging` to `target`, moving an existing `target` aside first
async fn swap_into_place(base: &Path, staging: &Path, target: &Path, sanitized: &str) -> FetchResult<()> {
    let rename_error = |e: std::io::Error| {
        FetchError::wrap(
            ErrorCode::DirectoryError,
            format!("Failed to move package into {}", target.display()),
            e,
        )
    };

    let retired = base.join(format!("{RETIRED_PREFIX}{sanitized}-{}", uuid::Uuid::new_v4()));
    let had_previous = match tokio::fs::rename(target, &retired).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(rename_error(e)),
    };

    if let Err(e) = tokio::fs::rename(staging, target).await {
        if had_previous && let Err(restore) = tokio::fs::rename(&retired, target).await {
            warn!(
                target: "docs_fetcher::storage",
                "Could not restore {} from {}: {restore}",
                target.display(),
                retired.display()
            );
        }
        return Err(rename_error(e));
    }

    if had_previous {
        remove_dir_quietly(&retired).await;
    }
    Ok(())
}

async fn create_dir(dir: &Path) -> FetchResult<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        FetchError::wrap(
            ErrorCode::DirectoryError,
            format!("Failed to create {}", dir.display()),
            e,
        )
    })
}

async fn write_file(path: &Path, bytes: &[u8]) -> FetchResult<()> {
    tokio::fs::write(path, bytes).await.map_err(|e| {
        FetchError::wrap(
            ErrorCode::FileWriteError,
            format!("Failed to write {}", path.display()),
            e,
        )
    })
}

async fn remove_dir_quietly(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        debug!(target: "docs_fetcher::storage", "Leaving {} behind: {e}", dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn page(url: &str, title: &str) -> SavedPage {
        SavedPage {
            record: PageRecord {
                url: url.to_string(),
                title: title.to_string(),
                content: format!("{title} content"),
                links: vec![format!("{url}/next")],
                fetched_at: Utc::now(),
            },
            html: format!("<html><title>{title}</title></html>"),
        }
    }

    #[test]
    fn package_dir_is_sanitized() {
        let manager = DirectoryManager::new("/tmp/packages");
        assert_eq!(
            manager.package_dir("@types/node"),
            PathBuf::from("/tmp/packages/_types_node")
        );
    }

    #[tokio::test]
    async fn save_writes_layout_and_metadata() {
        let tmp = TempDir::new().unwrap();
        let manager = DirectoryManager::new(tmp.path().join("packages"));

        let mut artifacts = PackageArtifacts::new(page("https://react.dev/reference/react", "React"));
        artifacts.pages.push(page("https://react.dev/reference/react/useState", "useState"));
        artifacts.stylesheets.push(Asset {
            url: "https://react.dev/main.css".to_string(),
            bytes: b"body{}".to_vec(),
        });

        let dir = manager.save_package("react", &artifacts).await.unwrap();
        assert!(dir.join("index.html").is_file());
        let html_name = url_to_filename("https://react.dev/reference/react/useState");
        assert!(html_name.starts_with("react.dev_reference_react_useState-"));
        assert!(dir.join(&html_name).is_file());
        assert!(dir.join(html_name.replace(".html", ".json")).is_file());
        assert_eq!(std::fs::read_dir(dir.join("css")).unwrap().count(), 1);
        assert!(!dir.join("images").exists());

        let record = manager.load_metadata("react").await.unwrap().unwrap();
        assert_eq!(record, artifacts.main.record);
        assert_eq!(manager.list_packages().await.unwrap(), vec!["react".to_string()]);
    }

    #[tokio::test]
    async fn resave_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let manager = DirectoryManager::new(tmp.path());

        let mut first = PackageArtifacts::new(page("https://a.dev/docs", "A"));
        first.pages.push(page("https://a.dev/docs/old", "Old"));
        manager.save_package("a", &first).await.unwrap();

        let second = PackageArtifacts::new(page("https://a.dev/docs", "A2"));
        let dir = manager.save_package("a", &second).await.unwrap();

        assert!(!dir.join(url_to_filename("https://a.dev/docs/old")).exists());
        assert_eq!(manager.load_metadata("a").await.unwrap().unwrap().title, "A2");
        assert_eq!(manager.list_packages().await.unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn pages_with_similar_urls_keep_separate_files() {
        let tmp = TempDir::new().unwrap();
        let manager = DirectoryManager::new(tmp.path());

        let mut artifacts = PackageArtifacts::new(page("https://a.dev/docs", "A"));
        artifacts.pages.push(page("https://a.dev/docs/a_b", "Underscore"));
        artifacts.pages.push(page("https://a.dev/docs/a/b", "Nested"));
        artifacts.pages.push(page("https://a.dev/docs/a.html", "Html"));
        artifacts.pages.push(page("https://a.dev/docs/a", "Bare"));

        let dir = manager.save_package("a", &artifacts).await.unwrap();
        for saved in &artifacts.pages {
            let html = std::fs::read_to_string(dir.join(url_to_filename(&saved.record.url))).unwrap();
            assert_eq!(html, saved.html);
        }
        let json_files = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .count();
        assert_eq!(json_files, 5);
    }

    #[tokio::test]
    async fn staged_package_is_invisible_until_committed() {
        let tmp = TempDir::new().unwrap();
        let manager = DirectoryManager::new(tmp.path());
        manager
            .save_package("a", &PackageArtifacts::new(page("https://a.dev/docs", "Old")))
            .await
            .unwrap();

        let staged = manager
            .stage_package("a", &PackageArtifacts::new(page("https://a.dev/docs", "New")))
            .await
            .unwrap();
        assert_eq!(manager.load_metadata("a").await.unwrap().unwrap().title, "Old");
        staged.discard().await;
        assert_eq!(manager.load_metadata("a").await.unwrap().unwrap().title, "Old");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);

        let staged = manager
            .stage_package("a", &PackageArtifacts::new(page("https://a.dev/docs", "New")))
            .await
            .unwrap();
        let dir = staged.commit().await.unwrap();
        assert_eq!(dir, manager.package_dir("a"));
        assert_eq!(manager.load_metadata("a").await.unwrap().unwrap().title, "New");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn remove_and_missing_metadata() {
        let tmp = TempDir::new().unwrap();
        let manager = DirectoryManager::new(tmp.path());

        assert!(manager.load_metadata("ghost").await.unwrap().is_none());
        assert!(!manager.remove_package("ghost").await.unwrap());

        manager
            .save_package("ghost", &PackageArtifacts::new(page("https://g.dev", "G")))
            .await
            .unwrap();
        assert!(manager.remove_package("ghost").await.unwrap());
        assert!(manager.list_packages().await.unwrap().is_empty());
    }
}

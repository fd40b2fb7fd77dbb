//! Package metadata lookup
//!
//! [`PackageInfoSource`] answers "what do we know about this package";
//! [`NpmRegistry`] answers it from the npm registry with a flat on-disk
//! stats file in front. [`known_docs_url`] short-circuits popular packages.

// Sub-modules
pub mod known_packages;
pub mod npm;
pub mod package_info;

use std::future::Future;

use crate::errors::FetchResult;

// Re-exports for public API
pub use known_packages::{KNOWN_PACKAGES, known_docs_url};
pub use npm::NpmRegistry;
pub use package_info::{PackageInfo, normalize_repository_url};

/// Source of package metadata
pub trait PackageInfoSource: Send + Sync {
    /// Metadata for `name`.
    ///
    /// Fails with [`crate::errors::ErrorCode::PackageNotFound`] when the
    /// package does not exist.
    fn get_package_info(&self, name: &str) -> impl Future<Output = FetchResult<PackageInfo>> + Send;
}

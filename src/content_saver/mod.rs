//! Package storage on disk
//!
//! Maps package names to directories under the packages root and writes
//! each package's artifacts in one all-or-nothing step.

// Sub-modules
pub mod directory_manager;
pub mod records;

// Re-exports for public API
pub use directory_manager::{DirectoryManager, StagedPackage};
pub use records::{Asset, PackageArtifacts, PageRecord, SavedPage, asset_file_name};

//! Configuration module for documentation fetching
//!
//! This module provides the `FetcherConfig` struct, its builder, and loading
//! from JSON files and the environment.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::FetcherConfigBuilder;
pub use types::FetcherConfig;

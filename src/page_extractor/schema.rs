//! Data extracted from one documentation page

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured signal extracted from raw HTML.
///
/// Derived deterministically from the input; every field falls back to its
/// empty value when extraction of that field fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub title: String,
    /// Heading level (1-6) to the non-empty headings of that level, in order
    pub headings: BTreeMap<u8, Vec<String>>,
    /// Visible body text, whitespace collapsed
    pub main_content: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub code_blocks: Vec<String>,
    pub links: Vec<String>,
    /// Anchors whose href mentions "api"
    pub api_references: Vec<String>,
}

impl ParsedDocument {
    #[must_use]
    pub fn heading_count(&self) -> usize {
        self.headings.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.main_content.split_whitespace().count()
    }
}

//! HTML extraction.
//!
//! Turns raw rendered HTML into a [`ParsedDocument`]: title, headings, main
//! text, meta description and keywords, code blocks and links.

// Sub-modules
pub mod parser;
pub mod schema;

// Re-exports for public API
pub use parser::{HtmlParser, parse_html};
pub use schema::ParsedDocument;

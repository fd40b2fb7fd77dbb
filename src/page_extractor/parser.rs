//! HTML to `ParsedDocument` extraction using `scraper`
//!
//! Parsing never fails on malformed markup. Each field is extracted on its
//! own; if its selector is unavailable the field stays empty and the rest of
//! the document is still extracted. Only empty input is rejected.

use log::warn;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::schema::ParsedDocument;
use crate::errors::{ErrorCode, FetchError, FetchResult};

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Schemes that never lead to a crawlable page
const EXCLUDED_SCHEMES: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];

// Parsed once at first access. A selector that fails to parse leaves its
// field empty rather than aborting the document.
static TITLE_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| selector("title"));
static BODY_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| selector("body"));
static META_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| selector("meta[content]"));
static CODE_BLOCK_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| selector("pre code"));
static ANCHOR_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| selector("a[href]"));
static HEADING_SELECTORS: LazyLock<Vec<(u8, Option<Selector>)>> =
    LazyLock::new(|| (1..=6).map(|level| (level, selector(&format!("h{level}")))).collect());

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(target: "docs_fetcher::parser", "Selector '{css}' failed to parse: {e}");
            None
        }
    }
}

/// Parses rendered HTML into a [`ParsedDocument`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract structured content from `html`.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::InvalidInput`] when `html` is empty or only whitespace.
    pub fn parse(&self, html: &str) -> FetchResult<ParsedDocument> {
        parse_html(html)
    }
}

/// Extract structured content from `html`. See [`HtmlParser::parse`].
pub fn parse_html(html: &str) -> FetchResult<ParsedDocument> {
    if html.trim().is_empty() {
        return Err(FetchError::new(
            ErrorCode::InvalidInput,
            "Cannot parse empty HTML",
        ));
    }

    let document = Html::parse_document(html);

    let (description, keywords) = extract_meta(&document);
    let anchors = extract_hrefs(&document);
    let api_references = anchors
        .iter()
        .filter(|href| href.contains("api"))
        .cloned()
        .collect();
    let links = anchors.into_iter().filter(|href| is_followable_href(href)).collect();

    Ok(ParsedDocument {
        title: extract_title(&document),
        headings: extract_headings(&document),
        main_content: extract_main_content(&document),
        description,
        keywords,
        code_blocks: extract_code_blocks(&document),
        links,
        api_references,
    })
}

/// Whitespace-collapsed text of an element, skipping hidden descendants
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

fn extract_title(document: &Html) -> String {
    let Some(selector) = TITLE_SELECTOR.as_ref() else {
        return String::new();
    };

    document
        .select(selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_headings(document: &Html) -> BTreeMap<u8, Vec<String>> {
    let mut headings = BTreeMap::new();

    for (level, selector) in HEADING_SELECTORS.iter() {
        let Some(selector) = selector else {
            continue;
        };

        let texts: Vec<String> = document
            .select(selector)
            .map(visible_text)
            .filter(|text| !text.is_empty())
            .collect();

        if !texts.is_empty() {
            headings.insert(*level, texts);
        }
    }

    headings
}

fn extract_main_content(document: &Html) -> String {
    let Some(selector) = BODY_SELECTOR.as_ref() else {
        return String::new();
    };

    document
        .select(selector)
        .next()
        .map(visible_text)
        .unwrap_or_default()
}

fn extract_meta(document: &Html) -> (String, Vec<String>) {
    let Some(selector) = META_SELECTOR.as_ref() else {
        return (String::new(), Vec::new());
    };

    let mut description = String::new();
    let mut og_description = String::new();
    let mut keywords = Vec::new();

    for meta in document.select(selector) {
        let element = meta.value();
        let content = element.attr("content").unwrap_or_default().trim();
        let name = element
            .attr("name")
            .or_else(|| element.attr("property"))
            .unwrap_or_default()
            .to_ascii_lowercase();

        match name.as_str() {
            "description" if description.is_empty() => description = content.to_string(),
            "og:description" if og_description.is_empty() => {
                og_description = content.to_string();
            }
            "keywords" if keywords.is_empty() => {
                keywords = content
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    if description.is_empty() {
        description = og_description;
    }

    (description, keywords)
}

fn extract_code_blocks(document: &Html) -> Vec<String> {
    let Some(selector) = CODE_BLOCK_SELECTOR.as_ref() else {
        return Vec::new();
    };

    document
        .select(selector)
        .map(|code| code.text().collect::<String>().trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Some(selector) = ANCHOR_SELECTOR.as_ref() else {
        return Vec::new();
    };

    document
        .select(selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_followable_href(href: &str) -> bool {
    if href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !EXCLUDED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

//! Content measurements the sub-scores are computed from

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::page_extractor::parser::visible_text;

static BODY: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("body").ok());
static HEADINGS: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").ok());
static CODE_BLOCKS: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("pre").ok());
static LISTS: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("ul, ol").ok());
static PARAGRAPHS: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("p").ok());
static SENTENCE_END: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[.!?]+").ok());

/// Counts and averages taken from one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSignals {
    /// Raw content length in bytes
    pub byte_size: usize,
    /// Visible text of the body
    pub text: String,
    pub word_count: usize,
    pub sentence_count: usize,
    pub heading_count: usize,
    pub code_block_count: usize,
    pub list_count: usize,
    pub paragraph_count: usize,
    /// Mean alphanumeric characters per word
    pub avg_word_length: f64,
}

impl ContentSignals {
    /// Measure `content`, which may be a full document, a fragment or plain text
    #[must_use]
    pub fn from_html(content: &str) -> Self {
        if content.trim().is_empty() {
            return Self {
                byte_size: content.len(),
                ..Self::default()
            };
        }

        let document = Html::parse_document(content);
        let text = BODY
            .as_ref()
            .and_then(|s| document.select(s).next())
            .map(visible_text)
            .unwrap_or_default();

        let words: Vec<&str> = text.split_whitespace().collect();
        let letters: usize = words
            .iter()
            .map(|w| w.chars().filter(|c| c.is_alphanumeric()).count())
            .sum();
        let avg_word_length = if words.is_empty() {
            0.0
        } else {
            letters as f64 / words.len() as f64
        };

        Self {
            byte_size: content.len(),
            word_count: words.len(),
            sentence_count: count_sentences(&text),
            heading_count: count_matches(&document, &HEADINGS),
            code_block_count: count_matches(&document, &CODE_BLOCKS),
            list_count: count_matches(&document, &LISTS),
            paragraph_count: count_matches(&document, &PARAGRAPHS),
            avg_word_length,
            text,
        }
    }

    /// Mean words per sentence; zero for empty text
    #[must_use]
    pub fn avg_sentence_length(&self) -> f64 {
        if self.sentence_count == 0 {
            0.0
        } else {
            self.word_count as f64 / self.sentence_count as f64
        }
    }
}

fn count_matches(document: &Html, selector: &Option<Selector>) -> usize {
    selector.as_ref().map_or(0, |s| document.select(s).count())
}

/// Segments between sentence terminators that contain at least one word.
/// Text without any terminator is one sentence.
fn count_sentences(text: &str) -> usize {
    if text.split_whitespace().next().is_none() {
        return 0;
    }

    let sentences = match SENTENCE_END.as_ref() {
        Some(re) => re
            .split(text)
            .filter(|s| s.split_whitespace().next().is_some())
            .count(),
        None => 1,
    };
    sentences.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_has_no_signals() {
        let signals = ContentSignals::from_html("   ");
        assert_eq!(signals.word_count, 0);
        assert_eq!(signals.sentence_count, 0);
        assert_eq!(signals.avg_sentence_length(), 0.0);
    }

    #[test]
    fn counts_structure() {
        let signals = ContentSignals::from_html(
            "<body><h1>Intro</h1><p>One two. Three four!</p><p>Five?</p>\
             <ul><li>six</li></ul><pre><code>let x = 1;</code></pre><script>ignored()</script></body>",
        );
        assert_eq!(signals.heading_count, 1);
        assert_eq!(signals.paragraph_count, 2);
        assert_eq!(signals.list_count, 1);
        assert_eq!(signals.code_block_count, 1);
        assert!(!signals.text.contains("ignored"));
    }

    #[test]
    fn plain_text_is_measured_as_body() {
        let signals = ContentSignals::from_html("just some words without a terminator");
        assert_eq!(signals.word_count, 6);
        assert_eq!(signals.sentence_count, 1);
        assert_eq!(signals.heading_count, 0);
    }
}

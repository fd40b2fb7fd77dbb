//! Common-word language detection
//!
//! Only English is recognized. Anything else is reported as `"unknown"`.

use serde::{Deserialize, Serialize};

/// Ratio of common English words at which text counts as English
pub const ENGLISH_RATIO_THRESHOLD: f64 = 0.05;

const COMMON_ENGLISH_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "do", "does", "each", "for", "from", "get", "has", "have",
    "how", "if", "in", "into", "is", "it", "its", "just", "like", "may", "more", "most", "must",
    "new", "no", "not", "of", "on", "one", "only", "or", "other", "our", "out", "should", "so",
    "some", "such", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "to", "up", "use", "used", "using", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "will", "with", "would", "you", "your",
];

/// Result of [`detect_language`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    /// `"en"` or `"unknown"`
    pub code: String,
    /// Share of tokens found in the common-word list
    pub ratio: f64,
}

impl LanguageGuess {
    #[must_use]
    pub fn is_english(&self) -> bool {
        self.code == "en"
    }
}

/// Classify `text` by the share of common English words among its tokens
#[must_use]
pub fn detect_language(text: &str) -> LanguageGuess {
    let mut total = 0usize;
    let mut common = 0usize;

    for token in text.split_whitespace() {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if word.is_empty() {
            continue;
        }
        total += 1;
        if COMMON_ENGLISH_WORDS.binary_search(&word.as_str()).is_ok() {
            common += 1;
        }
    }

    let ratio = if total == 0 {
        0.0
    } else {
        common as f64 / total as f64
    };
    let code = if ratio >= ENGLISH_RATIO_THRESHOLD {
        "en"
    } else {
        "unknown"
    };

    LanguageGuess {
        code: code.to_string(),
        ratio,
    }
}

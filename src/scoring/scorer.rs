//! Weighted documentation quality score

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::language::detect_language;
use super::options::ScoringOptions;
use super::signals::ContentSignals;
use crate::link_validator::LinkValidationResult;

/// Below this many words a document is penalized
pub const MIN_WORDS_FOR_FULL_SCORE: usize = 50;

/// Multiplier applied to the total when a document is too thin
pub const THIN_CONTENT_PENALTY: f64 = 0.3;

/// Exponent applied to the weighted sum
const SCORE_EXPONENT: f64 = 0.7;

/// Ideal mean sentence length in words
const IDEAL_SENTENCE_LENGTH: f64 = 17.5;

/// Ideal mean word length in characters
const IDEAL_WORD_LENGTH: f64 = 5.5;

/// Sub-scores and the counts they were derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetails {
    pub freshness: f64,
    pub size: f64,
    /// 1.0 for English, 0.3 otherwise
    pub language: f64,
    pub readability: f64,
    pub completeness: f64,
    pub word_count: usize,
    pub code_block_count: usize,
    pub heading_count: usize,
    /// `"en"` or `"unknown"`
    pub detected_language: String,
}

/// Quality estimate for one `(url, content)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationScore {
    pub url: String,
    /// Always within `[0, 1]`
    pub score: f64,
    pub details: ScoreDetails,
}

/// Scores documentation content
#[derive(Debug, Clone, Default)]
pub struct DocumentationScorer {
    options: ScoringOptions,
}

impl DocumentationScorer {
    #[must_use]
    pub fn new(options: ScoringOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &ScoringOptions {
        &self.options
    }

    /// Score `content` fetched from `url`.
    ///
    /// Empty content scores 0 with every sub-score 0. A failed validation
    /// result also scores 0, though the sub-scores are still reported.
    #[must_use]
    pub fn score_documentation(
        &self,
        url: &str,
        content: &str,
        validation: &LinkValidationResult,
    ) -> DocumentationScore {
        self.score_at(url, content, validation, Utc::now())
    }

    /// [`Self::score_documentation`] with an explicit clock
    #[must_use]
    pub fn score_at(
        &self,
        url: &str,
        content: &str,
        validation: &LinkValidationResult,
        now: DateTime<Utc>,
    ) -> DocumentationScore {
        let signals = ContentSignals::from_html(content);

        if signals.byte_size == 0 || signals.word_count == 0 {
            return DocumentationScore {
                url: url.to_string(),
                score: 0.0,
                details: ScoreDetails {
                    detected_language: "unknown".to_string(),
                    ..ScoreDetails::default()
                },
            };
        }

        let guess = detect_language(&signals.text);
        let details = ScoreDetails {
            freshness: self.freshness(validation.last_modified, now),
            size: self.size(signals.byte_size),
            language: if guess.is_english() { 1.0 } else { 0.3 },
            readability: readability(&signals),
            completeness: self.completeness(&signals),
            word_count: signals.word_count,
            code_block_count: signals.code_block_count,
            heading_count: signals.heading_count,
            detected_language: guess.code,
        };

        let unpenalized = self.unpenalized_total(&details);
        let mut score = unpenalized;
        if is_thin(&details) {
            score *= THIN_CONTENT_PENALTY;
        }
        if !validation.is_valid {
            score = 0.0;
        }
        let score = clamp_unit(score);

        debug!(
            target: "docs_fetcher::scoring",
            "Scored {url}: {score:.3} (words={}, code={}, headings={})",
            details.word_count,
            details.code_block_count,
            details.heading_count
        );

        DocumentationScore {
            url: url.to_string(),
            score,
            details,
        }
    }

    /// Weighted mean of the sub-scores raised to [`SCORE_EXPONENT`], before
    /// the thin-content penalty
    #[must_use]
    pub fn unpenalized_total(&self, details: &ScoreDetails) -> f64 {
        let w = &self.options.weights;
        let weight_sum = w.sum();
        if weight_sum <= 0.0 {
            return 0.0;
        }

        let weighted = details.freshness * w.freshness
            + details.size * w.size
            + details.language * w.language
            + details.readability * w.readability
            + details.completeness * w.completeness;

        clamp_unit(weighted / weight_sum).powf(SCORE_EXPONENT)
    }

    fn freshness(&self, last_modified: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(last_modified) = last_modified else {
            return 0.5;
        };

        let age_days = (now - last_modified).num_seconds().max(0) as f64 / 86_400.0;
        clamp_unit(1.0 - age_days / self.options.max_age_in_days)
    }

    /// Rises linearly from 0.5 at `min_size` to 1.0 at twice that, then
    /// falls back to 0.5 at `max_size`
    fn size(&self, bytes: usize) -> f64 {
        let min = self.options.min_size as f64;
        let max = self.options.max_size as f64;
        let bytes_f = bytes as f64;
        let peak = 2.0 * min;

        if bytes == 0 {
            0.0
        } else if bytes < self.options.min_size {
            0.3
        } else if bytes > self.options.max_size {
            0.5
        } else if bytes_f <= peak {
            clamp_unit(0.5 + 0.5 * (bytes_f - min) / min.max(1.0))
        } else {
            clamp_unit(1.0 - 0.5 * (bytes_f - peak) / (max - peak).max(1.0))
        }
    }

    fn completeness(&self, signals: &ContentSignals) -> f64 {
        let words = signals.word_count as f64;
        let headings = signals.heading_count;
        let code = signals.code_block_count;
        let min_words = self.options.min_word_count.max(1) as f64;

        let code_score = ratio(code as f64, 3.0);
        let structure_score = (ratio(headings as f64, 4.0)
            + ratio(signals.paragraph_count as f64, 5.0)
            + ratio(signals.list_count as f64, 2.0))
            / 3.0;
        let word_score = ratio(words, min_words);
        let distribution_score = heading_distribution(signals.word_count, headings);

        let mut score = 0.25 * code_score
            + 0.35 * structure_score
            + 0.25 * word_score
            + 0.15 * distribution_score;

        if code >= 3 && headings >= 4 && words >= 1.5 * min_words {
            score *= 1.5;
        } else if code >= 1 && headings >= 2 && words >= min_words {
            score *= 1.3;
        }

        if signals.word_count < MIN_WORDS_FOR_FULL_SCORE || code == 0 || headings == 0 {
            score *= 0.1;
        }

        clamp_unit(score)
    }
}

fn readability(signals: &ContentSignals) -> f64 {
    if signals.word_count == 0 {
        return 0.0;
    }

    let closeness = |value: f64, ideal: f64| 1.0 - ((value - ideal).abs() / ideal).min(1.0);
    let mut score = (closeness(signals.avg_sentence_length(), IDEAL_SENTENCE_LENGTH)
        + closeness(signals.avg_word_length, IDEAL_WORD_LENGTH))
        / 2.0;

    if signals.heading_count > 0 {
        score *= 1.2;
    }
    if signals.list_count > 0 {
        score *= 1.1;
    }
    if signals.paragraph_count > 1 {
        score *= 1.1;
    }
    score *= 1.0 + 0.2 * (signals.word_count.min(200) as f64 / 200.0);

    clamp_unit(score)
}

/// 1.0 when sections average 50 to 500 words, tapering outside that band
fn heading_distribution(words: usize, headings: usize) -> f64 {
    if headings == 0 || words == 0 {
        return 0.0;
    }

    let per_heading = words as f64 / headings as f64;
    if per_heading < 50.0 {
        per_heading / 50.0
    } else if per_heading > 500.0 {
        500.0 / per_heading
    } else {
        1.0
    }
}

fn is_thin(details: &ScoreDetails) -> bool {
    details.word_count < MIN_WORDS_FOR_FULL_SCORE
        || details.code_block_count == 0
        || details.heading_count == 0
}

fn ratio(value: f64, target: f64) -> f64 {
    (value / target).min(1.0)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

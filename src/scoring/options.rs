//! Scoring thresholds and weights

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorCode, FetchError, FetchResult};

/// Relative weight of each sub-score in the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub freshness: f64,
    pub size: f64,
    pub language: f64,
    pub readability: f64,
    pub completeness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            freshness: 0.2,
            size: 0.1,
            language: 0.2,
            readability: 0.3,
            completeness: 0.2,
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.freshness + self.size + self.language + self.readability + self.completeness
    }
}

/// Thresholds the sub-scores are measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Age at which freshness reaches zero
    pub max_age_in_days: f64,
    /// Content below this many bytes scores 0.3 on size
    pub min_size: usize,
    /// Content above this many bytes scores 0.5 on size
    pub max_size: usize,
    /// Word count that saturates the completeness word signal
    pub min_word_count: usize,
    pub weights: ScoringWeights,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            max_age_in_days: 365.0,
            min_size: 1_000,
            max_size: 1_000_000,
            min_word_count: 100,
            weights: ScoringWeights::default(),
        }
    }
}

impl ScoringOptions {
    pub fn validate(&self) -> FetchResult<()> {
        let w = &self.weights;
        let weights = [w.freshness, w.size, w.language, w.readability, w.completeness];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FetchError::new(
                ErrorCode::ValidationError,
                "scoring weights must be finite and non-negative",
            ));
        }
        if w.sum() <= 0.0 {
            return Err(FetchError::new(
                ErrorCode::ValidationError,
                "scoring weights must not all be zero",
            ));
        }
        if self.min_size == 0 || self.max_size <= self.min_size * 2 {
            return Err(FetchError::new(
                ErrorCode::ValidationError,
                "scoring sizes need 0 < 2 * min_size < max_size",
            ));
        }
        if self.max_age_in_days <= 0.0 || self.min_word_count == 0 {
            return Err(FetchError::new(
                ErrorCode::ValidationError,
                "max_age_in_days and min_word_count must be positive",
            ));
        }
        Ok(())
    }
}

//! Documentation Scorer
//!
//! Combines content signals and a link validation result into one quality
//! score in `[0, 1]` from five weighted sub-scores: freshness, size,
//! language, readability and completeness.

pub mod language;
pub mod options;
pub mod scorer;
pub mod signals;

pub use language::{LanguageGuess, detect_language};
pub use options::{ScoringOptions, ScoringWeights};
pub use scorer::{DocumentationScore, DocumentationScorer, ScoreDetails};
pub use signals::ContentSignals;

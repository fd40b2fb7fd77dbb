//! Outcome of a multi-package run

use super::state::FetchOutcome;
use crate::errors::{ErrorCode, FetchError, FetchResult};

/// Per-package results of [`super::DocsFetcher::fetch_docs_for_packages`]
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<FetchOutcome>,
    /// Package name and the error its fetch ended with
    pub failed: Vec<(String, FetchError)>,
}

impl BatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// All outcomes, or one [`ErrorCode::DocsProcessingError`] naming every
    /// package that failed
    pub fn into_result(self) -> FetchResult<Vec<FetchOutcome>> {
        if self.failed.is_empty() {
            return Ok(self.succeeded);
        }

        let details: Vec<String> = self
            .failed
            .iter()
            .map(|(name, err)| format!("{name} ({err})"))
            .collect();
        Err(FetchError::new(
            ErrorCode::DocsProcessingError,
            format!(
                "Failed to fetch documentation for {} of {} package(s): {}",
                self.failed.len(),
                self.total(),
                details.join(", ")
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_success() {
        let report = BatchReport::default();
        assert!(report.is_success());
        assert!(report.into_result().unwrap().is_empty());
    }

    #[test]
    fn failures_are_aggregated() {
        let report = BatchReport {
            succeeded: Vec::new(),
            failed: vec![
                ("a".to_string(), FetchError::new(ErrorCode::PackageNotFound, "missing")),
                ("b".to_string(), FetchError::new(ErrorCode::Timeout, "slow")),
            ],
        };
        let err = report.into_result().unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocsProcessingError);
        assert!(err.message().contains("a ([PACKAGE_NOT_FOUND] missing)"));
        assert!(err.message().contains("2 of 2"));
    }
}

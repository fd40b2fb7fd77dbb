//! Timeout utilities for network and browser operations

use std::future::Future;
use std::time::Duration;

use crate::errors::{ErrorCode, FetchError, FetchResult};

/// Run `operation` with an explicit deadline.
///
/// An elapsed deadline becomes an [`ErrorCode::Timeout`] error naming the
/// operation, so callers and the retry policy can tell it apart from a
/// failure reported by the operation itself.
pub async fn with_timeout<F, T>(duration: Duration, operation_name: &str, operation: F) -> FetchResult<T>
where
    F: Future<Output = FetchResult<T>>,
{
    match tokio::time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::new(
            ErrorCode::Timeout,
            format!("{operation_name} timed out after {} ms", duration.as_millis()),
        )),
    }
}

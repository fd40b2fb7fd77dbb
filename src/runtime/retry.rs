//! Retry with exponential backoff and jitter
//!
//! Every network-touching operation (registry lookups, page renders) goes
//! through [`retry`]. Only errors whose code is retryable are retried; the
//! rest propagate on the first failure.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::errors::FetchResult;

/// Retry configuration shared by all network operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Multiplier applied per further retry
    pub backoff_factor: f64,
    /// Upper bound for a single delay
    pub max_delay_ms: u64,
    /// Scale each delay by a random factor in [0.5, 1.0]
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff_factor: 2.0,
            max_delay_ms: 10_000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based), before jitter
    #[must_use]
    pub fn base_delay_for(&self, retry: u32) -> Duration {
        let multiplier = self.backoff_factor.max(1.0).powi(retry.min(16) as i32);
        let delay_ms = (self.base_delay_ms as f64 * multiplier).min(self.max_delay_ms as f64);
        Duration::from_millis(delay_ms as u64)
    }

    /// Delay before retry number `retry`, jitter applied when enabled
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = self.base_delay_for(retry);
        if self.jitter {
            let factor: f64 = rand::rng().random_range(0.5..=1.0);
            delay.mul_f64(factor)
        } else {
            delay
        }
    }
}

/// Retry an operation according to `policy`.
///
/// `operation` is called once per attempt. A non-retryable error, or the
/// last attempt's error, is returned unchanged.
pub async fn retry<F, Fut, T>(policy: &RetryPolicy, operation_name: &str, mut operation: F) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = operation_name, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }

                if attempt >= max_attempts {
                    tracing::error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %e,
                        "Max retry attempts exceeded"
                    );
                    return Err(e);
                }

                let delay = policy.delay_for(attempt - 1);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retryable error, retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

//! HTTP existence checks with timeout and content-type gating
//!
//! Validation based on HTTP status: 4xx/5xx is invalid, everything else is
//! valid unless an allow-list of content types is configured and the
//! response matches none of it. Network failures never surface as errors;
//! they produce an invalid result with `error` filled in.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, warn};
use reqwest::header::{CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, Method, StatusCode, redirect};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::{ErrorCode, FetchError, FetchResult};
use crate::utils::{CHROME_USER_AGENT, DEFAULT_VALIDATION_TIMEOUT_SECS, MAX_REDIRECTS};

/// Error text for a check that ran out of time
pub const TIMEOUT_ERROR: &str = "Request timed out";

/// Error text for a response whose content type is not allowed
pub const CONTENT_TYPE_ERROR: &str = "Invalid content type";

/// Outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkValidationResult {
    pub url: String,
    pub is_valid: bool,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub response_time_ms: u64,
    pub error: Option<String>,
    /// Parsed `Last-Modified` header, when the server sent one
    pub last_modified: Option<DateTime<Utc>>,
}

impl LinkValidationResult {
    fn failed(url: &str, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            url: url.to_string(),
            is_valid: false,
            status_code: None,
            content_type: None,
            response_time_ms: elapsed.as_millis() as u64,
            error: Some(error.into()),
            last_modified: None,
        }
    }
}

/// Per-check options
#[derive(Debug, Clone)]
pub struct LinkValidationOptions {
    pub timeout: Duration,
    /// Case-insensitive substrings; an empty list accepts any content type
    pub allowed_content_types: Vec<String>,
}

impl Default for LinkValidationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_VALIDATION_TIMEOUT_SECS),
            allowed_content_types: Vec::new(),
        }
    }
}

/// Checks URLs with HEAD requests, following redirects
#[derive(Debug, Clone)]
pub struct LinkValidator {
    client: Client,
    options: LinkValidationOptions,
}

impl LinkValidator {
    pub fn new(options: LinkValidationOptions) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(CHROME_USER_AGENT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::wrap(ErrorCode::InitError, "Failed to build HTTP client", e))?;

        Ok(Self { client, options })
    }

    #[must_use]
    pub fn options(&self) -> &LinkValidationOptions {
        &self.options
    }

    /// Check `url` with this validator's options
    pub async fn validate_link(&self, url: &str) -> LinkValidationResult {
        self.validate_link_with(url, &self.options).await
    }

    /// Check `url` with explicit options
    pub async fn validate_link_with(
        &self,
        url: &str,
        options: &LinkValidationOptions,
    ) -> LinkValidationResult {
        let start = Instant::now();

        if url::Url::parse(url).is_err() {
            return LinkValidationResult::failed(url, "Invalid URL", start.elapsed());
        }

        let response = match self.request(Method::HEAD, url, options.timeout).await {
            // Some servers refuse HEAD outright
            Ok(resp)
                if matches!(
                    resp.status(),
                    StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
                ) =>
            {
                debug!(target: "docs_fetcher::validator", "HEAD refused by {url}, retrying with GET");
                self.request(Method::GET, url, options.timeout).await
            }
            other => other,
        };

        let elapsed = start.elapsed();
        let response = match response {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                warn!(target: "docs_fetcher::validator", "Validation of {url} timed out");
                return LinkValidationResult::failed(url, TIMEOUT_ERROR, elapsed);
            }
            Err(e) => {
                warn!(target: "docs_fetcher::validator", "Validation of {url} failed: {e}");
                return LinkValidationResult::failed(url, e.to_string(), elapsed);
            }
        };

        let status = response.status().as_u16();
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let error = if status >= 400 {
            Some(format!("HTTP error: {status}"))
        } else if !content_type_allowed(content_type.as_deref(), &options.allowed_content_types) {
            Some(CONTENT_TYPE_ERROR.to_string())
        } else {
            None
        };

        LinkValidationResult {
            url: url.to_string(),
            is_valid: error.is_none(),
            status_code: Some(status),
            content_type,
            response_time_ms: elapsed.as_millis() as u64,
            error,
            last_modified,
        }
    }

    /// Check every URL concurrently; results come back in input order
    pub async fn validate_links<S: AsRef<str>>(&self, urls: &[S]) -> Vec<LinkValidationResult> {
        join_all(urls.iter().map(|url| self.validate_link(url.as_ref()))).await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client.request(method, url).timeout(timeout).send().await
    }
}

fn content_type_allowed(content_type: Option<&str>, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let Some(content_type) = content_type else {
        return false;
    };
    let content_type = content_type.to_ascii_lowercase();
    allowed
        .iter()
        .any(|entry| content_type.contains(&entry.to_ascii_lowercase()))
}

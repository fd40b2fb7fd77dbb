//! Link Validator
//!
//! Lightweight reachability checks for candidate documentation URLs:
//! status code, content type, latency and Last-Modified.

pub mod validator;

pub use validator::{
    CONTENT_TYPE_ERROR, LinkValidationOptions, LinkValidationResult, LinkValidator, TIMEOUT_ERROR,
};

//! Async helpers shared by every network-touching operation
//!
//! One retry policy and one timeout wrapper, so backoff math and timeout
//! error mapping live in a single place instead of at each call site.

pub mod retry;
pub mod timeout;

pub use retry::{RetryPolicy, retry};
pub use timeout::with_timeout;

//! Shared HTTP client construction: retry middleware and a pool keyed by
//! retry policy.

mod client;
mod pool;

pub use client::create_retryable_http_client;
pub use pool::{HttpClientPool, HttpClientPoolError};

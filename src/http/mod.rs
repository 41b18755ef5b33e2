//! HTTP transport with retry on transient failures.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{
    DEFAULT_MAX_RETRIES, DEFAULT_MAX_RETRY_INTERVAL, DEFAULT_MIN_RETRY_INTERVAL,
    RETRYABLE_STATUSES, RetryPolicy, is_transient_error,
};

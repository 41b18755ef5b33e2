//! Retry configuration for transient HTTP failures.
//!
//! Backoff and attempt counting are done by `reqwest-retry`; this module only
//! describes which failures count as transient.

use reqwest::{Method, Response, StatusCode};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{Retryable, RetryableStrategy};
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Shortest wait before a retry.
pub const DEFAULT_MIN_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Longest wait before a retry.
pub const DEFAULT_MAX_RETRY_INTERVAL: Duration = Duration::from_secs(120);

/// Status codes treated as transient.
pub const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Declarative retry configuration applied by [`super::HttpClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub total: usize,
    pub min_retry_interval: Duration,
    pub max_retry_interval: Duration,
    pub status_forcelist: Vec<StatusCode>,
    pub allowed_methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total: DEFAULT_MAX_RETRIES,
            min_retry_interval: DEFAULT_MIN_RETRY_INTERVAL,
            max_retry_interval: DEFAULT_MAX_RETRY_INTERVAL,
            status_forcelist: RETRYABLE_STATUSES.to_vec(),
            allowed_methods: vec![Method::GET, Method::POST],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            total: 0,
            ..Self::default()
        }
    }

    pub fn is_method_retryable(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    pub fn is_status_retryable(&self, method: &Method, status: StatusCode) -> bool {
        self.is_method_retryable(method) && self.status_forcelist.contains(&status)
    }

    /// Exponential backoff handed to `RetryTransientMiddleware`.
    pub fn exponential_backoff(&self) -> ExponentialBackoff {
        let max_interval = self.max_retry_interval.max(self.min_retry_interval);
        ExponentialBackoff::builder()
            .retry_bounds(self.min_retry_interval, max_interval)
            .build_with_max_retries(u32::try_from(self.total).unwrap_or(u32::MAX))
    }

    pub(crate) fn strategy(&self) -> TransientStrategy {
        TransientStrategy {
            statuses: self.status_forcelist.clone(),
        }
    }
}

/// Marks forcelisted statuses and connect/timeout failures as transient.
pub(crate) struct TransientStrategy {
    statuses: Vec<StatusCode>,
}

impl RetryableStrategy for TransientStrategy {
    fn handle(&self, res: &Result<Response, reqwest_middleware::Error>) -> Option<Retryable> {
        match res {
            Ok(response) if self.statuses.contains(&response.status()) => {
                Some(Retryable::Transient)
            }
            Ok(_) => None,
            Err(reqwest_middleware::Error::Reqwest(e)) if is_transient_error(e) => {
                Some(Retryable::Transient)
            }
            Err(_) => Some(Retryable::Fatal),
        }
    }
}

/// Transport failures worth another attempt: the server was unreachable or slow.
pub fn is_transient_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

//! Client configuration and its resolution from flags and environment.

use log::debug;
use std::time::Duration;

use crate::http::RetryPolicy;
use crate::runtime::Runtime;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "BANKING_API_URL";

/// Base URL used when neither a flag nor the environment provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8123";

/// Request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Uses `base_url` if given, else `BANKING_API_URL`, else the localhost default.
    /// Empty values count as unset.
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime>(runtime: &R, base_url: Option<String>) -> Self {
        let base_url = base_url
            .filter(|url| !url.is_empty())
            .or_else(|| {
                runtime
                    .env_var(BASE_URL_ENV)
                    .ok()
                    .filter(|url| !url.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        debug!("Resolved base URL: {}", base_url);

        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.retry.total = max_retries;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_explicit_base_url_wins() {
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().never();

        let config = ClientConfig::resolve(&runtime, Some("http://bank.test".to_string()));
        assert_eq!(config.base_url, "http://bank.test");
    }

    #[test]
    fn test_env_base_url() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(BASE_URL_ENV))
            .returning(|_| Ok("http://env.bank.test".to_string()));

        let config = ClientConfig::resolve(&runtime, None);
        assert_eq!(config.base_url, "http://env.bank.test");
    }

    #[test]
    fn test_default_base_url() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(BASE_URL_ENV))
            .returning(|_| Err(std::env::VarError::NotPresent));

        let config = ClientConfig::resolve(&runtime, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.total, 3);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(BASE_URL_ENV))
            .returning(|_| Ok(String::new()));

        let config = ClientConfig::resolve(&runtime, Some(String::new()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::default()
            .with_base_url("http://other")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(0);
        assert_eq!(config.base_url, "http://other");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.total, 0);
    }
}

//! Runtime abstraction for process environment access.
//!
//! Configuration code reads the environment through [`Runtime`] so tests can
//! inject values with `MockRuntime` instead of mutating the process state.

use std::env;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    fn env_var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Runtime backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

impl Runtime for RealRuntime {
    #[tracing::instrument(skip(self))]
    fn env_var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_runtime_env_var() {
        let runtime = RealRuntime;

        // PATH should exist on all systems
        assert!(runtime.env_var("PATH").is_ok());
        assert!(
            runtime
                .env_var("BANKING_CLIENT_SURELY_UNSET_VARIABLE")
                .is_err()
        );
    }
}

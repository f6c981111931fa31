//! Context provider port
//!
//! Each provider supplies one [`SliceKind`] of the context bundle. The
//! aggregator runs providers concurrently under a per-provider timeout and
//! records any failure instead of raising it.

use async_trait::async_trait;
use runtime_domain::access::Identity;
use runtime_domain::context::{ContextSlice, SliceKind};
use runtime_domain::core::error::RuntimeError;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a context provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider returned a {actual} slice, expected {expected}")]
    WrongSlice {
        expected: SliceKind,
        actual: SliceKind,
    },

    #[error("Provider timed out after {0}ms")]
    Timeout(u64),
}

impl ProviderError {
    /// Attribute this failure to `provider`.
    pub fn into_runtime_error(self, provider: impl Into<String>) -> RuntimeError {
        RuntimeError::ContextProvider {
            provider: provider.into(),
            message: self.to_string(),
        }
    }
}

/// Port for a source of one context slice.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Stable identifier reported in `failed_providers`.
    fn id(&self) -> &str;

    /// The slice this provider serves.
    fn kind(&self) -> SliceKind;

    /// Provider-specific timeout; `None` uses the aggregator default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Produce the slice on behalf of `caller`.
    async fn fetch(&self, caller: &Identity) -> Result<ContextSlice, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_runtime_error() {
        let err = ProviderError::Timeout(250).into_runtime_error("git");
        assert_eq!(err.code().as_str(), "CONTEXT_PROVIDER_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Context provider 'git' failed: Provider timed out after 250ms"
        );
    }
}

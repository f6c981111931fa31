//! Use case parameters.

use runtime_domain::MemoryLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Invocation engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Timeout applied when a request does not carry its own.
    pub default_timeout: Duration,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineParams {
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

/// Context aggregation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationParams {
    /// Per-provider timeout for providers that don't declare one.
    pub provider_timeout: Duration,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(2),
        }
    }
}

impl AggregationParams {
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}

/// Memory store parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryParams {
    pub limits: MemoryLimits,
}

impl MemoryParams {
    pub fn with_limits(mut self, limits: MemoryLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// All use case parameters in one value, as produced by the config loader.
///
/// Each use case takes only the slice it needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeParams {
    pub engine: EngineParams,
    pub aggregation: AggregationParams,
    pub memory: MemoryParams,
}

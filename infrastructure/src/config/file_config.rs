//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use crate::access::AccessRule;
use runtime_application::{AggregationParams, EngineParams, MemoryParams, RuntimeParams};
use runtime_domain::{MemoryLimits, Sensitivity};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("{0} cannot be 0")]
    ZeroLimit(&'static str),

    #[error("audit.enabled is set but audit.path is missing")]
    MissingAuditPath,

    #[error("context.memory_keys contains an empty key")]
    EmptyMemoryKey,
}

/// Raw invocation engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Timeout for invocations that don't carry their own
    pub default_timeout_ms: u64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
        }
    }
}

/// Raw context aggregation configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContextConfig {
    /// Per-provider timeout for providers without their own
    pub provider_timeout_ms: u64,
    /// Memory keys surfaced in the memory slice
    pub memory_keys: Vec<String>,
    /// Static system slice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<serde_json::Value>,
    /// Static workspace slice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<serde_json::Value>,
    /// Static user slice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
}

impl Default for FileContextConfig {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 2_000,
            memory_keys: Vec::new(),
            system: None,
            workspace: None,
            user: None,
        }
    }
}

/// Raw memory store configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub max_key_length: usize,
    pub max_value_bytes: usize,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        let limits = MemoryLimits::default();
        Self {
            max_key_length: limits.max_key_length,
            max_value_bytes: limits.max_value_bytes,
        }
    }
}

/// Raw access control configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAccessConfig {
    /// Highest sensitivity allowed when no rule matches
    pub default_ceiling: Sensitivity,
    /// Rules evaluated in order; first match decides
    pub rules: Vec<AccessRule>,
}

impl Default for FileAccessConfig {
    fn default() -> Self {
        Self {
            default_ceiling: Sensitivity::Internal,
            rules: Vec::new(),
        }
    }
}

/// Raw audit log configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    pub enabled: bool,
    /// JSONL file the audit trail is appended to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    pub context: FileContextConfig,
    pub memory: FileMemoryConfig,
    pub access: FileAccessConfig,
    pub audit: FileAuditConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.engine.default_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroTimeout(
                "engine.default_timeout_ms",
            ));
        }
        if self.context.provider_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroTimeout(
                "context.provider_timeout_ms",
            ));
        }
        if self.memory.max_key_length == 0 {
            return Err(ConfigValidationError::ZeroLimit("memory.max_key_length"));
        }
        if self.memory.max_value_bytes == 0 {
            return Err(ConfigValidationError::ZeroLimit("memory.max_value_bytes"));
        }
        if self.context.memory_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyMemoryKey);
        }
        if self.audit.enabled && self.audit.path.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigValidationError::MissingAuditPath);
        }
        Ok(())
    }

    /// Convert into the parameter structs the use cases take.
    pub fn to_runtime_params(&self) -> RuntimeParams {
        RuntimeParams {
            engine: EngineParams::default()
                .with_default_timeout(Duration::from_millis(self.engine.default_timeout_ms)),
            aggregation: AggregationParams::default()
                .with_provider_timeout(Duration::from_millis(self.context.provider_timeout_ms)),
            memory: MemoryParams::default().with_limits(MemoryLimits {
                max_key_length: self.memory.max_key_length,
                max_value_bytes: self.memory.max_value_bytes,
            }),
        }
    }
}

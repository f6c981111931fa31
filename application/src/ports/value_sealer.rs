//! Value sealing port
//!
//! The memory store passes values through a [`ValueSealer`] before they
//! reach the repository and after they come back. Hosts that need
//! encryption at rest plug in a sealer; the algorithm is theirs to choose.

use runtime_domain::access::Sensitivity;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Sealing failed for '{key}': {message}")]
pub struct SealError {
    pub key: String,
    pub message: String,
}

impl SealError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Port for transforming memory values at rest.
pub trait ValueSealer: Send + Sync {
    fn seal(&self, key: &str, value: Value, sensitivity: Sensitivity) -> Result<Value, SealError>;

    fn unseal(&self, key: &str, value: Value, sensitivity: Sensitivity)
    -> Result<Value, SealError>;
}

/// Stores values as-is.
pub struct PlainSealer;

impl ValueSealer for PlainSealer {
    fn seal(&self, _key: &str, value: Value, _sensitivity: Sensitivity) -> Result<Value, SealError> {
        Ok(value)
    }

    fn unseal(
        &self,
        _key: &str,
        value: Value,
        _sensitivity: Sensitivity,
    ) -> Result<Value, SealError> {
        Ok(value)
    }
}

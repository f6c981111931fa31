//! Validation errors for tool calls and descriptors

use thiserror::Error;

use super::entities::ParamType;

/// Why a tool call (or a descriptor) failed validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required parameter '{name}'")]
    MissingParameter { name: String },

    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("parameter '{name}' expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        actual: &'static str,
    },

    #[error("parameter '{name}' violates constraint: {detail}")]
    ConstraintViolated { name: String, detail: String },

    #[error("output expects {expected}, got {actual}")]
    OutputMismatch {
        expected: ParamType,
        actual: &'static str,
    },

    #[error("output is {actual} bytes, limit is {max}")]
    OutputTooLarge { actual: usize, max: usize },

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

impl ValidationError {
    pub fn suggestion(&self) -> String {
        match self {
            ValidationError::MissingParameter { name } => {
                format!("Supply a value for '{}'", name)
            }
            ValidationError::UnknownParameter { name } => {
                format!("Remove '{}' or check the tool descriptor", name)
            }
            ValidationError::TypeMismatch { name, expected, .. } => {
                format!("Pass '{}' as {}", name, expected)
            }
            ValidationError::ConstraintViolated { name, .. } => {
                format!("Adjust '{}' to satisfy the declared constraints", name)
            }
            ValidationError::OutputMismatch { .. } | ValidationError::OutputTooLarge { .. } => {
                "The tool violated its declared contract".to_string()
            }
            ValidationError::InvalidDescriptor(_) => "Fix the tool descriptor".to_string(),
        }
    }

    /// Output checks fail on the tool's side, not the caller's.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ValidationError::OutputMismatch { .. } | ValidationError::OutputTooLarge { .. }
        )
    }
}

//! Runtime error taxonomy
//!
//! Every failure the runtime surfaces to a caller is a [`RuntimeError`].
//! Each variant maps to a stable machine-checkable [`ErrorCode`], a
//! `recoverable` flag and an optional remediation suggestion, which is what
//! ends up in the error envelope.
//!
//! | Code | Recoverable? | Raised by |
//! |------|-------------|-----------|
//! | `TOOL_NOT_FOUND` | Yes | Registry, engine |
//! | `DUPLICATE_TOOL` | No | Registry |
//! | `TOOL_VALIDATION_ERROR` | Yes | Engine (before any side effect) |
//! | `ACCESS_DENIED` | No | Engine, memory store |
//! | `TOOL_EXECUTION_ERROR` | No | Engine (tool failure or contract violation) |
//! | `TOOL_TIMEOUT` | Yes | Engine |
//! | `MEMORY_NOT_FOUND` | Yes | Memory store |
//! | `MEMORY_CONFLICT` | Yes | Memory store (re-read and retry) |
//! | `MEMORY_VALIDATION_ERROR` | Yes | Memory store |
//! | `CONTEXT_PROVIDER_ERROR` | Yes | Aggregator (recorded, never raised) |
//! | `INVALID_REQUEST` | No | Dispatcher |
//! | `STORAGE_ERROR` | No | Memory store |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tool::validation::ValidationError;

/// Machine-checkable error code carried in every error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ToolNotFound,
    DuplicateTool,
    ToolValidationError,
    AccessDenied,
    ToolExecutionError,
    ToolTimeout,
    MemoryNotFound,
    MemoryConflict,
    MemoryValidationError,
    ContextProviderError,
    InvalidRequest,
    StorageError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ToolNotFound => "TOOL_NOT_FOUND",
            ErrorCode::DuplicateTool => "DUPLICATE_TOOL",
            ErrorCode::ToolValidationError => "TOOL_VALIDATION_ERROR",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::ToolExecutionError => "TOOL_EXECUTION_ERROR",
            ErrorCode::ToolTimeout => "TOOL_TIMEOUT",
            ErrorCode::MemoryNotFound => "MEMORY_NOT_FOUND",
            ErrorCode::MemoryConflict => "MEMORY_CONFLICT",
            ErrorCode::MemoryValidationError => "MEMORY_VALIDATION_ERROR",
            ErrorCode::ContextProviderError => "CONTEXT_PROVIDER_ERROR",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::StorageError => "STORAGE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors surfaced by the runtime core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid call to tool '{tool}': {source}")]
    ToolValidation {
        tool: String,
        #[source]
        source: ValidationError,
    },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Tool '{tool}' timed out after {timeout_ms}ms")]
    ToolTimeout { tool: String, timeout_ms: u64 },

    #[error("Memory entry not found: {0}")]
    MemoryNotFound(String),

    #[error("Memory conflict on '{key}': expected version {expected}, found {actual}")]
    MemoryConflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid memory operation: {0}")]
    MemoryValidation(String),

    #[error("Context provider '{provider}' failed: {message}")]
    ContextProvider { provider: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RuntimeError {
    /// Shorthand for a validation failure against a tool descriptor.
    pub fn validation(tool: impl Into<String>, source: ValidationError) -> Self {
        RuntimeError::ToolValidation {
            tool: tool.into(),
            source,
        }
    }

    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::ToolNotFound(_) => ErrorCode::ToolNotFound,
            RuntimeError::DuplicateTool(_) => ErrorCode::DuplicateTool,
            RuntimeError::ToolValidation { .. } => ErrorCode::ToolValidationError,
            RuntimeError::AccessDenied(_) => ErrorCode::AccessDenied,
            RuntimeError::ToolExecution { .. } => ErrorCode::ToolExecutionError,
            RuntimeError::ToolTimeout { .. } => ErrorCode::ToolTimeout,
            RuntimeError::MemoryNotFound(_) => ErrorCode::MemoryNotFound,
            RuntimeError::MemoryConflict { .. } => ErrorCode::MemoryConflict,
            RuntimeError::MemoryValidation(_) => ErrorCode::MemoryValidationError,
            RuntimeError::ContextProvider { .. } => ErrorCode::ContextProviderError,
            RuntimeError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            RuntimeError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// Whether the caller can reasonably retry after changing its input or
    /// re-reading state. Nothing in the core retries on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RuntimeError::ToolNotFound(_)
                | RuntimeError::ToolValidation { .. }
                | RuntimeError::ToolTimeout { .. }
                | RuntimeError::MemoryNotFound(_)
                | RuntimeError::MemoryConflict { .. }
                | RuntimeError::MemoryValidation(_)
                | RuntimeError::ContextProvider { .. }
        )
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            RuntimeError::ToolNotFound(_) => {
                Some("Run a discover request to list registered tools".to_string())
            }
            RuntimeError::DuplicateTool(name) => Some(format!(
                "Unregister '{}' before registering a replacement",
                name
            )),
            RuntimeError::ToolValidation { source, .. } => Some(source.suggestion()),
            RuntimeError::ToolTimeout { .. } => Some(
                "Retry with a longer timeout; the tool may still have produced side effects"
                    .to_string(),
            ),
            RuntimeError::MemoryNotFound(key) => {
                Some(format!("Create '{}' before reading or updating it", key))
            }
            RuntimeError::MemoryConflict { key, actual, .. } => Some(format!(
                "Re-read '{}' (current version {}) and retry the write",
                key, actual
            )),
            RuntimeError::ContextProvider { .. } => {
                Some("Treat the context bundle as partial".to_string())
            }
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RuntimeError::MemoryConflict { .. })
    }
}

/// Result type alias using [`RuntimeError`].
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            RuntimeError::ToolNotFound("x".into()).code().as_str(),
            "TOOL_NOT_FOUND"
        );
        assert_eq!(
            RuntimeError::MemoryConflict {
                key: "k".into(),
                expected: 1,
                actual: 2
            }
            .code()
            .as_str(),
            "MEMORY_CONFLICT"
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::ToolTimeout).unwrap(),
            "\"TOOL_TIMEOUT\""
        );
    }

    #[test]
    fn test_recoverable_flags() {
        assert!(
            RuntimeError::ToolTimeout {
                tool: "t".into(),
                timeout_ms: 10
            }
            .is_recoverable()
        );
        assert!(!RuntimeError::AccessDenied("nope".into()).is_recoverable());
        assert!(!RuntimeError::execution("t", "boom").is_recoverable());
        assert!(!RuntimeError::DuplicateTool("t".into()).is_recoverable());
    }

    #[test]
    fn test_validation_error_display() {
        let err = RuntimeError::validation(
            "file_reader",
            ValidationError::MissingParameter {
                name: "path".into(),
            },
        );
        assert_eq!(err.code(), ErrorCode::ToolValidationError);
        assert!(err.to_string().contains("file_reader"));
        assert!(err.to_string().contains("path"));
        assert!(err.suggestion().unwrap().contains("path"));
    }

    #[test]
    fn test_conflict_suggestion_mentions_current_version() {
        let err = RuntimeError::MemoryConflict {
            key: "prefs".into(),
            expected: 1,
            actual: 3,
        };
        assert!(err.is_conflict());
        assert!(err.suggestion().unwrap().contains("version 3"));
    }
}

//! Tool handler port
//!
//! A [`ToolHandler`] is the implementation behind a registered descriptor.
//! The engine only calls it with arguments that already passed validation
//! and authorization.

use async_trait::async_trait;
use runtime_domain::tool::ValidatedArgs;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Failure reported by a tool implementation.
///
/// The message is passed through to the caller unchanged inside a
/// `TOOL_EXECUTION_ERROR`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolFailure {
    pub message: String,
}

impl ToolFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for tool implementations.
///
/// `cancel` fires when the engine stops waiting (timeout). Implementations
/// should observe it to stop early; the engine does not wait for them to do
/// so and cannot undo side effects already performed.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(
        &self,
        args: &ValidatedArgs,
        cancel: CancellationToken,
    ) -> Result<Value, ToolFailure>;
}

/// Adapts a synchronous closure into a [`ToolHandler`].
pub struct FnToolHandler<F> {
    f: F,
}

impl<F> FnToolHandler<F>
where
    F: Fn(&ValidatedArgs) -> Result<Value, ToolFailure> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> ToolHandler for FnToolHandler<F>
where
    F: Fn(&ValidatedArgs) -> Result<Value, ToolFailure> + Send + Sync,
{
    async fn invoke(
        &self,
        args: &ValidatedArgs,
        _cancel: CancellationToken,
    ) -> Result<Value, ToolFailure> {
        (self.f)(args)
    }
}

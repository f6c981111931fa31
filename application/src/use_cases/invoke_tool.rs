//! Invoke Tool use case.
//!
//! [`InvocationEngine`] drives a single tool call through the invocation
//! state machine:
//!
//! 1. **Resolve** - look the tool up in the registry
//! 2. **Validate** - check arguments against the descriptor, apply defaults
//! 3. **Authorize** - ask the access gate, using the highest sensitivity of
//!    the tool and the parameters supplied
//! 4. **Execute** - run the handler under a timeout with a cancellation token
//! 5. **Shape** - check the output against the declared return type
//!
//! Validation and authorization failures end the call before the handler
//! runs. No step is retried.

use crate::config::EngineParams;
use crate::ports::access_control::AccessControlPort;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::tool_registry::ToolRegistryPort;
use runtime_domain::access::{AccessDecision, AccessRequest, Action, ResourceKind};
use runtime_domain::core::error::RuntimeError;
use runtime_domain::core::string::truncate;
use runtime_domain::tool::{
    DefaultToolValidator, InvocationRequest, InvocationResult, InvocationState,
    InvocationTracker, ToolValidator,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Executes tool calls against the registry.
pub struct InvocationEngine {
    registry: Arc<dyn ToolRegistryPort>,
    access: Arc<dyn AccessControlPort>,
    validator: Arc<dyn ToolValidator + Send + Sync>,
    audit: Arc<dyn AuditLogger>,
    params: EngineParams,
    cancellation_token: Option<CancellationToken>,
}

impl InvocationEngine {
    pub fn new(
        registry: Arc<dyn ToolRegistryPort>,
        access: Arc<dyn AccessControlPort>,
        params: EngineParams,
    ) -> Self {
        Self {
            registry,
            access,
            validator: Arc::new(DefaultToolValidator),
            audit: Arc::new(NoAuditLogger),
            params,
            cancellation_token: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn ToolValidator + Send + Sync>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Parent token for every handler token. Cancelling it (e.g. on host
    /// shutdown) cancels all in-flight handlers.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Run one invocation to a terminal state.
    ///
    /// Never returns an `Err`: every failure is captured in the returned
    /// [`InvocationResult`] together with the state it ended in.
    pub async fn invoke(&self, request: InvocationRequest) -> InvocationResult {
        let started = Instant::now();
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let mut tracker = InvocationTracker::new(&invocation_id, &request.tool_name);

        debug!(
            invocation_id = %invocation_id,
            tool = %request.tool_name,
            caller = %request.caller.id,
            "Invocation received"
        );

        let result = self.run(&request, &mut tracker, started).await;
        self.record(&request, &tracker, &result);
        result
    }

    async fn run(
        &self,
        request: &InvocationRequest,
        tracker: &mut InvocationTracker,
        started: Instant,
    ) -> InvocationResult {
        // ========== Resolve ==========
        let tool = match self.registry.resolve(&request.tool_name) {
            Ok(tool) => tool,
            Err(e) => return fail(tracker, InvocationState::Failed, e, started),
        };
        let descriptor = &tool.descriptor;

        // ========== Validate ==========
        let args = match self.validator.validate(&request.arguments, descriptor) {
            Ok(args) => args,
            Err(e) => {
                debug!(tool = %descriptor.name, error = %e, "Arguments rejected");
                return fail(
                    tracker,
                    InvocationState::Failed,
                    RuntimeError::validation(&descriptor.name, e),
                    started,
                );
            }
        };
        transition(tracker, InvocationState::Validated);

        // ========== Authorize ==========
        let sensitivity = descriptor.effective_sensitivity(
            request.arguments.keys().map(String::as_str),
        );
        let access_request = AccessRequest::new(
            &request.caller,
            ResourceKind::Tool,
            &descriptor.name,
            Action::Invoke,
            sensitivity,
        );
        if let AccessDecision::Deny { reason } = self.access.authorize(&access_request) {
            info!(
                tool = %descriptor.name,
                caller = %request.caller.id,
                sensitivity = %sensitivity,
                "Invocation denied"
            );
            return fail(
                tracker,
                InvocationState::Failed,
                RuntimeError::AccessDenied(reason),
                started,
            );
        }
        transition(tracker, InvocationState::Authorized);

        // ========== Execute ==========
        let timeout = request.timeout().unwrap_or(self.params.default_timeout);
        let cancel = match &self.cancellation_token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        transition(tracker, InvocationState::Executing);

        let handler = Arc::clone(&tool.handler);
        let outcome = tokio::time::timeout(timeout, handler.invoke(&args, cancel.clone())).await;

        let output = match outcome {
            Ok(Ok(output)) => output,
            Ok(Err(failure)) => {
                debug!(
                    tool = %descriptor.name,
                    message = %truncate(&failure.message, 200),
                    "Tool reported failure"
                );
                return fail(
                    tracker,
                    InvocationState::Failed,
                    RuntimeError::execution(&descriptor.name, failure.message),
                    started,
                );
            }
            Err(_) => {
                // Stop waiting and signal the handler; it may keep running.
                cancel.cancel();
                return fail(
                    tracker,
                    InvocationState::TimedOut,
                    RuntimeError::ToolTimeout {
                        tool: descriptor.name.clone(),
                        timeout_ms: duration_ms(timeout),
                    },
                    started,
                );
            }
        };

        // ========== Shape ==========
        if let Err(e) = self.validator.check_output(&output, descriptor) {
            warn!(tool = %descriptor.name, error = %e, "Tool broke its output contract");
            return fail(
                tracker,
                InvocationState::Failed,
                RuntimeError::execution(&descriptor.name, e.to_string()),
                started,
            );
        }

        transition(tracker, InvocationState::Completed);
        InvocationResult::completed(
            tracker.id(),
            tracker.tool_name(),
            output,
            duration_ms(started.elapsed()),
        )
    }

    fn record(
        &self,
        request: &InvocationRequest,
        tracker: &InvocationTracker,
        result: &InvocationResult,
    ) {
        let error_code = result.error().map(|e| e.code().as_str());
        info!(
            invocation_id = %result.invocation_id,
            tool = %result.tool_name,
            caller = %request.caller.id,
            state = %result.state.as_str(),
            duration_ms = result.duration_ms,
            error_code = error_code.unwrap_or(""),
            "Invocation finished"
        );
        self.audit.log(AuditEvent::new(
            "invocation",
            json!({
                "invocation_id": result.invocation_id,
                "tool": result.tool_name,
                "caller": request.caller.id,
                "state": result.state.as_str(),
                "history": tracker.history().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                "duration_ms": result.duration_ms,
                "error_code": error_code,
            }),
        ));
    }
}

fn transition(tracker: &mut InvocationTracker, next: InvocationState) {
    if let Err(e) = tracker.advance(next) {
        error!(invocation_id = %tracker.id(), error = %e, "Invocation state machine violated");
    }
}

fn fail(
    tracker: &mut InvocationTracker,
    state: InvocationState,
    error: RuntimeError,
    started: Instant,
) -> InvocationResult {
    transition(tracker, state);
    InvocationResult::failed(
        tracker.id(),
        tracker.tool_name(),
        tracker.state(),
        error,
        duration_ms(started.elapsed()),
    )
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

//! Dispatch use case.
//!
//! [`RuntimeDispatcher`] is the single entry point for envelope traffic. It
//! decodes the request payload, routes the operation to the registry,
//! engine, memory store or aggregator, and wraps the outcome in exactly one
//! reply envelope carrying the request's id.

use crate::ports::tool_registry::ToolRegistryPort;
use crate::use_cases::aggregate_context::ContextAggregator;
use crate::use_cases::invoke_tool::InvocationEngine;
use crate::use_cases::memory_store::MemoryStore;
use runtime_domain::core::error::RuntimeError;
use runtime_domain::protocol::{MessageEnvelope, RuntimeOperation, RuntimeRequest};
use runtime_domain::tool::InvocationRequest;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// A failed operation, with whatever the operation knew when it failed.
///
/// `details` becomes the payload of the error envelope. It is an empty
/// object for everything except invocations, which report their id, tool,
/// terminal state and duration.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchError {
    pub error: RuntimeError,
    pub details: Value,
}

impl From<RuntimeError> for DispatchError {
    fn from(error: RuntimeError) -> Self {
        Self {
            error,
            details: json!({}),
        }
    }
}

/// Routes request envelopes to the runtime components.
pub struct RuntimeDispatcher {
    registry: Arc<dyn ToolRegistryPort>,
    engine: Arc<InvocationEngine>,
    memory: Arc<MemoryStore>,
    aggregator: Arc<ContextAggregator>,
}

impl RuntimeDispatcher {
    pub fn new(
        registry: Arc<dyn ToolRegistryPort>,
        engine: Arc<InvocationEngine>,
        memory: Arc<MemoryStore>,
        aggregator: Arc<ContextAggregator>,
    ) -> Self {
        Self {
            registry,
            engine,
            memory,
            aggregator,
        }
    }

    /// Handle one envelope. Always returns a reply with the same id.
    pub async fn handle(&self, envelope: MessageEnvelope) -> MessageEnvelope {
        if !envelope.is_request() {
            return envelope.reply(Err(RuntimeError::InvalidRequest(format!(
                "expected a request envelope, got '{}'",
                envelope.kind
            ))));
        }

        let request = match RuntimeRequest::from_payload(&envelope.payload) {
            Ok(request) => request,
            Err(e) => return envelope.reply(Err(e)),
        };

        debug!(
            id = %envelope.id,
            op = request.operation.name(),
            caller = %request.caller.id,
            "Dispatching request"
        );
        match self.execute(request).await {
            Ok(payload) => envelope.reply(Ok(payload)),
            Err(DispatchError { error, details }) => {
                MessageEnvelope::error(envelope.id.clone(), &error).with_payload(details)
            }
        }
    }

    /// Run a decoded request and produce the response payload.
    pub async fn execute(&self, request: RuntimeRequest) -> Result<Value, DispatchError> {
        let RuntimeRequest { caller, operation } = request;
        match operation {
            RuntimeOperation::Invoke {
                tool,
                arguments,
                timeout_ms,
            } => {
                let invocation = InvocationRequest {
                    tool_name: tool,
                    arguments,
                    caller,
                    timeout_ms,
                };
                let result = self.engine.invoke(invocation).await;
                let mut details = json!({
                    "invocation_id": &result.invocation_id,
                    "tool_name": &result.tool_name,
                    "state": result.state,
                    "duration_ms": result.duration_ms,
                });
                match result.into_result() {
                    Ok(output) => {
                        details["output"] = output;
                        Ok(details)
                    }
                    Err(error) => Err(DispatchError { error, details }),
                }
            }
            RuntimeOperation::Discover { filter } => {
                let tools: Vec<_> = self.registry.discover(filter).collect();
                encode(&tools)
            }
            RuntimeOperation::GetTool { name } => encode(&self.registry.get(&name)?),
            RuntimeOperation::Aggregate { slices } => {
                encode(&self.aggregator.aggregate(&slices, &caller).await)
            }
            RuntimeOperation::MemoryCreate {
                key,
                value,
                sensitivity,
            } => encode(&self.memory.create(&key, value, &caller, sensitivity).await?),
            RuntimeOperation::MemoryRead { key } => {
                encode(&self.memory.read(&key, &caller).await?)
            }
            RuntimeOperation::MemoryUpdate {
                key,
                expected_version,
                value,
            } => encode(
                &self
                    .memory
                    .update(&key, expected_version, value, &caller)
                    .await?,
            ),
            RuntimeOperation::MemoryDelete {
                key,
                expected_version,
            } => encode(&self.memory.delete(&key, expected_version, &caller).await?),
            RuntimeOperation::MemoryList { prefix } => {
                let entries: Vec<_> = self.memory.list(prefix.as_deref(), &caller).await?.collect();
                encode(&entries)
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|e| {
        RuntimeError::Storage(format!("failed to encode response: {}", e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AggregationParams, EngineParams, MemoryParams};
    use crate::ports::access_control::AllowAll;
    use crate::ports::memory_repository::{MemoryRepository, RepositoryError, ensure_revision};
    use crate::ports::tool_handler::{FnToolHandler, ToolFailure, ToolHandler};
    use crate::ports::tool_registry::{Discovery, RegisteredTool};
    use async_trait::async_trait;
    use runtime_domain::access::Identity;
    use runtime_domain::core::error::RuntimeResult;
    use runtime_domain::memory::{EntryRevision, MemoryEntry, MemoryMetadata};
    use runtime_domain::protocol::EnvelopeKind;
    use runtime_domain::tool::{ParamType, ToolDescriptor, ToolFilter, ToolParameter};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    #[derive(Default)]
    struct MockRegistry {
        tools: Mutex<Vec<Arc<RegisteredTool>>>,
    }

    impl ToolRegistryPort for MockRegistry {
        fn register(
            &self,
            descriptor: ToolDescriptor,
            handler: Arc<dyn ToolHandler>,
        ) -> RuntimeResult<()> {
            self.tools
                .lock()
                .unwrap()
                .push(Arc::new(RegisteredTool::new(descriptor, handler)));
            Ok(())
        }

        fn unregister(&self, _name: &str) -> RuntimeResult<()> {
            Ok(())
        }

        fn resolve(&self, name: &str) -> RuntimeResult<Arc<RegisteredTool>> {
            self.tools
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.name() == name)
                .cloned()
                .ok_or_else(|| RuntimeError::ToolNotFound(name.to_string()))
        }

        fn discover(&self, filter: Option<ToolFilter>) -> Discovery {
            Discovery::new(self.tools.lock().unwrap().clone(), filter)
        }

        fn len(&self) -> usize {
            self.tools.lock().unwrap().len()
        }
    }

    #[derive(Default)]
    struct MockRepository {
        entries: Mutex<BTreeMap<String, MemoryEntry>>,
    }

    #[async_trait]
    impl MemoryRepository for MockRepository {
        async fn get(&self, key: &str) -> Result<Option<MemoryEntry>, RepositoryError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn insert_if_absent(
            &self,
            entry: MemoryEntry,
        ) -> Result<MemoryEntry, RepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            if let Some(existing) = entries.get(&entry.key) {
                return Err(RepositoryError::AlreadyExists {
                    key: entry.key.clone(),
                    version: existing.version,
                });
            }
            entries.insert(entry.key.clone(), entry.clone());
            Ok(entry)
        }

        async fn compare_and_swap(
            &self,
            key: &str,
            expected: EntryRevision,
            value: Value,
        ) -> Result<MemoryEntry, RepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            let current = entries
                .get(key)
                .ok_or_else(|| RepositoryError::NotFound(key.to_string()))?;
            ensure_revision(current, expected)?;
            let next = current.next(value);
            entries.insert(key.to_string(), next.clone());
            Ok(next)
        }

        async fn delete_if_version(
            &self,
            key: &str,
            _expected: EntryRevision,
        ) -> Result<MemoryEntry, RepositoryError> {
            self.entries
                .lock()
                .unwrap()
                .remove(key)
                .ok_or_else(|| RepositoryError::NotFound(key.to_string()))
        }

        async fn list(
            &self,
            _prefix: Option<&str>,
        ) -> Result<Vec<MemoryMetadata>, RepositoryError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .values()
                .map(MemoryEntry::metadata)
                .collect())
        }
    }

    fn dispatcher() -> RuntimeDispatcher {
        let registry: Arc<dyn ToolRegistryPort> = Arc::new(MockRegistry::default());
        registry
            .register(
                ToolDescriptor::new("echo", "Echo a message", ParamType::Object)
                    .with_parameter(ToolParameter::new("message", ParamType::String, true)),
                Arc::new(FnToolHandler::new(|args| {
                    Ok(json!({"echo": args.get_str("message")}))
                })),
            )
            .unwrap();
        registry
            .register(
                ToolDescriptor::new("disk.wipe", "Always fails", ParamType::Object),
                Arc::new(FnToolHandler::new(|_| {
                    Err(ToolFailure::new("device busy"))
                })),
            )
            .unwrap();

        let engine = Arc::new(InvocationEngine::new(
            Arc::clone(&registry),
            Arc::new(AllowAll),
            EngineParams::default(),
        ));
        let memory = Arc::new(MemoryStore::new(
            Arc::new(MockRepository::default()),
            Arc::new(AllowAll),
            MemoryParams::default(),
        ));
        let aggregator = Arc::new(ContextAggregator::new(AggregationParams::default()));
        RuntimeDispatcher::new(registry, engine, memory, aggregator)
    }

    fn request(id: &str, payload: Value) -> MessageEnvelope {
        let mut payload = payload;
        payload["caller"] = json!({"id": "agent-1"});
        MessageEnvelope::request(id, payload)
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_invoke_round_trip() {
        let reply = dispatcher()
            .handle(request(
                "r1",
                json!({"op": "invoke", "tool": "echo", "arguments": {"message": "hi"}}),
            ))
            .await;

        assert_eq!(reply.id, "r1");
        assert_eq!(reply.kind, EnvelopeKind::Response);
        assert_eq!(reply.payload["state"], "completed");
        assert_eq!(reply.payload["output"], json!({"echo": "hi"}));
    }

    #[tokio::test]
    async fn test_invoke_validation_error_envelope() {
        let reply = dispatcher()
            .handle(request("r2", json!({"op": "invoke", "tool": "echo"})))
            .await;

        assert_eq!(reply.id, "r2");
        assert!(reply.is_error());
        let error = reply.error.unwrap();
        assert_eq!(error.code.as_str(), "TOOL_VALIDATION_ERROR");
        assert!(error.recoverable);
        assert!(error.suggestion.is_some());
        assert_eq!(reply.payload["state"], "failed");
        assert_eq!(reply.payload["tool_name"], "echo");
    }

    #[tokio::test]
    async fn test_failed_invocation_keeps_its_record() {
        let reply = dispatcher()
            .handle(request("r3", json!({"op": "invoke", "tool": "disk.wipe"})))
            .await;

        assert_eq!(reply.id, "r3");
        assert_eq!(reply.error_code().unwrap().as_str(), "TOOL_EXECUTION_ERROR");
        assert!(reply.error.as_ref().unwrap().message.contains("device busy"));
        assert!(!reply.payload["invocation_id"].as_str().unwrap().is_empty());
        assert_eq!(reply.payload["tool_name"], "disk.wipe");
        assert_eq!(reply.payload["state"], "failed");
        assert!(reply.payload["duration_ms"].is_u64());
        assert!(reply.payload.get("output").is_none());
    }

    #[tokio::test]
    async fn test_non_invoke_failure_has_empty_payload() {
        let reply = dispatcher()
            .handle(request("m", json!({"op": "memory.read", "key": "nope"})))
            .await;
        assert_eq!(reply.error_code().unwrap().as_str(), "MEMORY_NOT_FOUND");
        assert_eq!(reply.payload, json!({}));
    }

    #[tokio::test]
    async fn test_discover_and_get_tool() {
        let dispatcher = dispatcher();
        let reply = dispatcher
            .handle(request("d", json!({"op": "discover"})))
            .await;
        assert_eq!(reply.payload.as_array().unwrap().len(), 2);

        let reply = dispatcher
            .handle(request("g", json!({"op": "get_tool", "name": "missing"})))
            .await;
        assert_eq!(reply.error_code().unwrap().as_str(), "TOOL_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_memory_operations() {
        let dispatcher = dispatcher();
        let created = dispatcher
            .handle(request(
                "m1",
                json!({"op": "memory.create", "key": "k", "value": {"a": 1}}),
            ))
            .await;
        assert_eq!(created.payload["version"], 1);

        let updated = dispatcher
            .handle(request(
                "m2",
                json!({"op": "memory.update", "key": "k", "expected_version": 1, "value": 2}),
            ))
            .await;
        assert_eq!(updated.payload["version"], 2);

        let stale = dispatcher
            .handle(request(
                "m3",
                json!({"op": "memory.update", "key": "k", "expected_version": 1, "value": 3}),
            ))
            .await;
        assert_eq!(stale.id, "m3");
        assert_eq!(stale.error_code().unwrap().as_str(), "MEMORY_CONFLICT");

        let listed = dispatcher
            .handle(request("m4", json!({"op": "memory.list"})))
            .await;
        assert_eq!(listed.payload[0]["key"], "k");
        assert!(listed.payload[0].get("value").is_none());

        dispatcher
            .handle(request("m5", json!({"op": "memory.delete", "key": "k"})))
            .await;
        let gone = dispatcher
            .handle(request("m6", json!({"op": "memory.read", "key": "k"})))
            .await;
        assert_eq!(gone.error_code().unwrap().as_str(), "MEMORY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_aggregate_returns_bundle() {
        let reply = dispatcher()
            .handle(request("a", json!({"op": "aggregate", "slices": ["system"]})))
            .await;
        assert_eq!(reply.payload["partial"], true);
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let dispatcher = dispatcher();

        let not_request = dispatcher
            .handle(MessageEnvelope::response("x", json!({})))
            .await;
        assert_eq!(not_request.id, "x");
        assert_eq!(not_request.error_code().unwrap().as_str(), "INVALID_REQUEST");

        let bad_payload = dispatcher
            .handle(MessageEnvelope::request("y", json!({"op": "teleport"})))
            .await;
        assert_eq!(bad_payload.id, "y");
        assert_eq!(bad_payload.error_code().unwrap().as_str(), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_execute_directly() {
        let payload = dispatcher()
            .execute(RuntimeRequest::new(
                Identity::new("agent-1"),
                RuntimeOperation::Discover {
                    filter: Some(ToolFilter::prefix("nothing")),
                },
            ))
            .await
            .unwrap();
        assert_eq!(payload, json!([]));
    }
}

//! Runtime assembly
//!
//! [`AgentRuntime`] wires the default adapters into the application use
//! cases from a loaded [`FileConfig`]: in-memory registry and memory
//! repository, policy-based access control, the configured context
//! providers, and the JSONL audit log when enabled.

use crate::access::PolicyAccessControl;
use crate::config::FileConfig;
use crate::context::{MemoryContextProvider, RegistryToolsProvider, StaticContextProvider};
use crate::logging::JsonlAuditLogger;
use crate::memory::InMemoryMemoryRepository;
use crate::tools::InMemoryToolRegistry;
use runtime_application::ports::access_control::AccessControlPort;
use runtime_application::ports::audit_logger::{AuditLogger, NoAuditLogger};
use runtime_application::ports::tool_registry::ToolRegistryPort;
use runtime_application::{ContextAggregator, InvocationEngine, MemoryStore, RuntimeDispatcher};
use runtime_domain::context::ContextSlice;
use runtime_domain::protocol::MessageEnvelope;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A fully wired runtime.
///
/// Tools are registered through [`registry`](Self::registry) after
/// construction; everything else is fixed by the config.
pub struct AgentRuntime {
    registry: Arc<InMemoryToolRegistry>,
    engine: Arc<InvocationEngine>,
    memory: Arc<MemoryStore>,
    aggregator: Arc<ContextAggregator>,
    dispatcher: RuntimeDispatcher,
    shutdown: CancellationToken,
}

impl AgentRuntime {
    /// Build a runtime from a validated config.
    pub fn from_config(config: &FileConfig) -> Self {
        let params = config.to_runtime_params();
        let audit = open_audit_logger(config);
        let shutdown = CancellationToken::new();

        let registry = Arc::new(InMemoryToolRegistry::new());
        let registry_port: Arc<dyn ToolRegistryPort> = registry.clone();
        let access: Arc<dyn AccessControlPort> = Arc::new(
            PolicyAccessControl::new(config.access.default_ceiling)
                .with_rules(config.access.rules.iter().cloned()),
        );

        let memory = Arc::new(
            MemoryStore::new(
                Arc::new(InMemoryMemoryRepository::new()),
                Arc::clone(&access),
                params.memory,
            )
            .with_audit_logger(Arc::clone(&audit)),
        );

        let engine = Arc::new(
            InvocationEngine::new(Arc::clone(&registry_port), access, params.engine)
                .with_audit_logger(Arc::clone(&audit))
                .with_cancellation(shutdown.child_token()),
        );

        let mut aggregator = ContextAggregator::new(params.aggregation)
            .with_audit_logger(audit)
            .with_provider(Arc::new(RegistryToolsProvider::new(Arc::clone(
                &registry_port,
            ))))
            .with_provider(Arc::new(MemoryContextProvider::new(
                Arc::clone(&memory),
                config.context.memory_keys.iter().cloned(),
            )));
        let static_slices = [
            ("config.system", config.context.system.clone().map(ContextSlice::System)),
            (
                "config.workspace",
                config.context.workspace.clone().map(ContextSlice::Workspace),
            ),
            ("config.user", config.context.user.clone().map(ContextSlice::User)),
        ];
        for (id, slice) in static_slices
            .into_iter()
            .filter_map(|(id, slice)| slice.map(|s| (id, s)))
        {
            aggregator = aggregator.with_provider(Arc::new(StaticContextProvider::new(id, slice)));
        }
        let aggregator = Arc::new(aggregator);

        info!(
            providers = ?aggregator.provider_ids(),
            rules = config.access.rules.len(),
            "Agent runtime ready"
        );

        let dispatcher = RuntimeDispatcher::new(
            registry_port,
            Arc::clone(&engine),
            Arc::clone(&memory),
            Arc::clone(&aggregator),
        );

        Self {
            registry,
            engine,
            memory,
            aggregator,
            dispatcher,
            shutdown,
        }
    }

    pub fn registry(&self) -> &Arc<InMemoryToolRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<InvocationEngine> {
        &self.engine
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    pub fn aggregator(&self) -> &Arc<ContextAggregator> {
        &self.aggregator
    }

    pub fn dispatcher(&self) -> &RuntimeDispatcher {
        &self.dispatcher
    }

    /// Handle one request envelope.
    pub async fn handle(&self, envelope: MessageEnvelope) -> MessageEnvelope {
        self.dispatcher.handle(envelope).await
    }

    /// Cancel every in-flight invocation.
    pub fn shutdown(&self) {
        info!("Agent runtime shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

fn open_audit_logger(config: &FileConfig) -> Arc<dyn AuditLogger> {
    if !config.audit.enabled {
        return Arc::new(NoAuditLogger);
    }
    let Some(path) = config.audit.path.as_deref() else {
        warn!("Audit log enabled without a path, auditing disabled");
        return Arc::new(NoAuditLogger);
    };
    match JsonlAuditLogger::new(path) {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoAuditLogger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_application::ports::tool_handler::FnToolHandler;
    use runtime_domain::access::{Action, Identity, ResourceKind};
    use runtime_domain::context::SliceKind;
    use runtime_domain::protocol::EnvelopeKind;
    use runtime_domain::tool::{ParamType, ReturnSpec, ToolDescriptor, ToolParameter};
    use serde_json::{Value, json};
    use std::io::Read;

    use crate::access::AccessRule;

    fn runtime_with(config: FileConfig) -> AgentRuntime {
        let runtime = AgentRuntime::from_config(&config);
        runtime
            .registry()
            .register(
                ToolDescriptor::new(
                    "text.upper",
                    "Uppercase a string",
                    ReturnSpec::new(ParamType::String, "Uppercased text"),
                )
                .with_parameter(ToolParameter::new("text", ParamType::String, true)),
                Arc::new(FnToolHandler::new(|args| {
                    Ok(json!(args.get_str("text").unwrap_or_default().to_uppercase()))
                })),
            )
            .unwrap();
        runtime
    }

    fn request(id: &str, caller: &str, payload: Value) -> MessageEnvelope {
        let mut payload = payload;
        payload["caller"] = json!({"id": caller});
        MessageEnvelope::request(id, payload)
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_invoke_through_envelope() {
        let runtime = runtime_with(FileConfig::default());

        let reply = runtime
            .handle(request(
                "1",
                "agent",
                json!({"op": "invoke", "tool": "text.upper", "arguments": {"text": "hi"}}),
            ))
            .await;

        assert_eq!(reply.kind, EnvelopeKind::Response);
        assert_eq!(reply.payload["output"], "HI");
    }

    #[tokio::test]
    async fn test_policy_rules_from_config() {
        let mut config = FileConfig::default();
        config.access.rules = vec![
            AccessRule::deny()
                .on(ResourceKind::Tool)
                .with_prefix("text.")
                .with_actions([Action::Invoke]),
        ];
        let runtime = runtime_with(config);

        let reply = runtime
            .handle(request(
                "1",
                "agent",
                json!({"op": "invoke", "tool": "text.upper", "arguments": {"text": "hi"}}),
            ))
            .await;

        assert_eq!(reply.error_code().unwrap().as_str(), "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn test_context_from_config_and_memory() {
        let mut config = FileConfig::default();
        config.context.system = Some(json!({"os": "linux"}));
        config.context.memory_keys = vec!["prefs".to_string()];
        let runtime = runtime_with(config);

        let caller = Identity::new("alice");
        runtime
            .memory()
            .create(
                "prefs",
                json!({"theme": "dark"}),
                &caller,
                Default::default(),
            )
            .await
            .unwrap();

        let bundle = runtime
            .aggregator()
            .aggregate(
                &[SliceKind::System, SliceKind::Tools, SliceKind::Memory],
                &caller,
            )
            .await;

        assert!(bundle.is_complete());
        assert_eq!(bundle.system["os"], "linux");
        assert_eq!(bundle.tools.len(), 1);
        assert_eq!(bundle.memory["prefs"]["theme"], "dark");
    }

    #[tokio::test]
    async fn test_unconfigured_slice_is_partial() {
        let runtime = runtime_with(FileConfig::default());

        let bundle = runtime
            .aggregator()
            .aggregate(&[SliceKind::Workspace], &Identity::new("alice"))
            .await;

        assert!(bundle.partial);
        assert!(bundle.failed_providers.is_empty());
    }

    #[tokio::test]
    async fn test_audit_log_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut config = FileConfig::default();
        config.audit.enabled = true;
        config.audit.path = Some(path.to_string_lossy().into_owned());

        let runtime = runtime_with(config);
        runtime
            .handle(request(
                "1",
                "agent",
                json!({"op": "invoke", "tool": "text.upper", "arguments": {"text": "x"}}),
            ))
            .await;
        drop(runtime);

        let mut content = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let first: Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first["type"], "invocation");
    }

    #[test]
    fn test_shutdown_flag() {
        let runtime = AgentRuntime::from_config(&FileConfig::default());
        assert!(!runtime.is_shut_down());
        runtime.shutdown();
        assert!(runtime.is_shut_down());
    }
}

//! Tools slice backed by the tool registry.

use async_trait::async_trait;
use runtime_application::ports::context_provider::{ContextProvider, ProviderError};
use runtime_application::ports::tool_registry::ToolRegistryPort;
use runtime_domain::access::Identity;
use runtime_domain::context::{ContextSlice, SliceKind};
use runtime_domain::tool::ToolFilter;
use std::sync::Arc;

/// Supplies the `tools` slice: a snapshot of the registry at fetch time.
pub struct RegistryToolsProvider {
    registry: Arc<dyn ToolRegistryPort>,
    filter: Option<ToolFilter>,
}

impl RegistryToolsProvider {
    pub fn new(registry: Arc<dyn ToolRegistryPort>) -> Self {
        Self {
            registry,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: ToolFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[async_trait]
impl ContextProvider for RegistryToolsProvider {
    fn id(&self) -> &str {
        "registry"
    }

    fn kind(&self) -> SliceKind {
        SliceKind::Tools
    }

    async fn fetch(&self, _caller: &Identity) -> Result<ContextSlice, ProviderError> {
        Ok(ContextSlice::Tools(
            self.registry.discover(self.filter.clone()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::InMemoryToolRegistry;
    use runtime_application::ports::tool_handler::FnToolHandler;
    use runtime_domain::tool::{ParamType, ToolDescriptor};
    use serde_json::json;

    #[tokio::test]
    async fn test_snapshot_of_registry() {
        let registry = Arc::new(InMemoryToolRegistry::new());
        for name in ["fs.read", "net.get"] {
            registry
                .register(
                    ToolDescriptor::new(name, "", ParamType::Object),
                    Arc::new(FnToolHandler::new(|_| Ok(json!(null)))),
                )
                .unwrap();
        }

        let provider = RegistryToolsProvider::new(registry.clone());
        let ContextSlice::Tools(tools) = provider.fetch(&Identity::new("a")).await.unwrap() else {
            panic!("expected a tools slice");
        };
        assert_eq!(tools.len(), 2);

        let filtered = RegistryToolsProvider::new(registry).with_filter(ToolFilter::prefix("fs."));
        let ContextSlice::Tools(tools) = filtered.fetch(&Identity::new("a")).await.unwrap() else {
            panic!("expected a tools slice");
        };
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "fs.read");
    }
}

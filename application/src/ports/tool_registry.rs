//! Tool registry port
//!
//! The registry owns descriptors and their handlers. Lookups hand out an
//! `Arc<RegisteredTool>`, so an invocation that already resolved its tool
//! keeps running even if the tool is unregistered meanwhile.

use runtime_domain::core::error::RuntimeResult;
use runtime_domain::tool::{ToolDescriptor, ToolFilter};
use std::sync::Arc;

use super::tool_handler::ToolHandler;

/// A descriptor together with its implementation handle.
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn new(descriptor: ToolDescriptor, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            descriptor,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Lazy sequence of descriptors returned by discovery.
///
/// Iterates a snapshot taken when discovery was called, in insertion
/// order. Descriptors are cloned one at a time as the sequence advances.
/// Cloning the sequence restarts it from the beginning of its snapshot.
#[derive(Debug, Clone)]
pub struct Discovery {
    snapshot: Arc<[Arc<RegisteredTool>]>,
    filter: Option<ToolFilter>,
    position: usize,
}

impl Discovery {
    pub fn new(snapshot: Vec<Arc<RegisteredTool>>, filter: Option<ToolFilter>) -> Self {
        Self {
            snapshot: snapshot.into(),
            filter,
            position: 0,
        }
    }

    /// Start again from the first descriptor of the same snapshot.
    pub fn restart(&mut self) {
        self.position = 0;
    }
}

impl Iterator for Discovery {
    type Item = ToolDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(tool) = self.snapshot.get(self.position) {
            self.position += 1;
            let matches = self
                .filter
                .as_ref()
                .is_none_or(|filter| filter.matches(&tool.descriptor));
            if matches {
                return Some(tool.descriptor.clone());
            }
        }
        None
    }
}

/// Port for the tool registry.
pub trait ToolRegistryPort: Send + Sync {
    /// Register a tool. Fails with `DuplicateTool` if the name is taken, or
    /// `ToolValidation` if the descriptor is malformed.
    fn register(
        &self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> RuntimeResult<()>;

    /// Remove a tool. Fails with `ToolNotFound` if absent.
    fn unregister(&self, name: &str) -> RuntimeResult<()>;

    /// Resolve a tool together with its handler.
    fn resolve(&self, name: &str) -> RuntimeResult<Arc<RegisteredTool>>;

    /// Descriptors in insertion order, optionally filtered.
    fn discover(&self, filter: Option<ToolFilter>) -> Discovery;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, name: &str) -> RuntimeResult<ToolDescriptor> {
        self.resolve(name).map(|tool| tool.descriptor.clone())
    }

    fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_handler::FnToolHandler;
    use runtime_domain::access::Sensitivity;
    use runtime_domain::tool::ParamType;
    use serde_json::json;

    fn tool(name: &str, sensitivity: Sensitivity) -> Arc<RegisteredTool> {
        let handler = Arc::new(FnToolHandler::new(|_| Ok(json!(null))));
        Arc::new(RegisteredTool::new(
            ToolDescriptor::new(name, "", ParamType::Object).with_sensitivity(sensitivity),
            handler,
        ))
    }

    #[test]
    fn test_discovery_is_ordered_and_restartable() {
        let mut discovery = Discovery::new(
            vec![
                tool("b", Sensitivity::Public),
                tool("a", Sensitivity::Public),
            ],
            None,
        );
        let names: Vec<_> = discovery.by_ref().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(discovery.next().is_none());

        discovery.restart();
        assert_eq!(discovery.next().unwrap().name, "b");
    }

    #[test]
    fn test_discovery_filter() {
        let discovery = Discovery::new(
            vec![
                tool("fs.read", Sensitivity::Public),
                tool("fs.delete", Sensitivity::Secret),
                tool("net.fetch", Sensitivity::Public),
            ],
            Some(ToolFilter::prefix("fs.").with_max_sensitivity(Sensitivity::Internal)),
        );
        let names: Vec<_> = discovery.map(|d| d.name).collect();
        assert_eq!(names, vec!["fs.read"]);
    }
}

//! In-memory tool registry
//!
//! [`InMemoryToolRegistry`] implements [`ToolRegistryPort`]. Tools are kept
//! behind a single `RwLock`; lookups take the read side and clone an `Arc`,
//! so invocations never hold the lock while a tool runs.
//!
//! # Usage
//!
//! ```
//! use runtime_application::{FnToolHandler, ToolRegistryPort};
//! use runtime_domain::tool::{ParamType, ToolDescriptor, ToolParameter};
//! use runtime_infrastructure::InMemoryToolRegistry;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = InMemoryToolRegistry::new();
//! registry
//!     .register(
//!         ToolDescriptor::new("echo", "Echo a message", ParamType::String)
//!             .with_parameter(ToolParameter::new("message", ParamType::String, true)),
//!         Arc::new(FnToolHandler::new(|args| Ok(json!(args.get_str("message"))))),
//!     )
//!     .unwrap();
//!
//! assert!(registry.contains("echo"));
//! assert_eq!(registry.discover(None).count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use runtime_application::ports::tool_handler::ToolHandler;
use runtime_application::ports::tool_registry::{Discovery, RegisteredTool, ToolRegistryPort};
use runtime_domain::access::Sensitivity;
use runtime_domain::core::error::{RuntimeError, RuntimeResult};
use runtime_domain::tool::{ToolDescriptor, ToolFilter};

#[derive(Default)]
struct Inner {
    by_name: HashMap<String, Arc<RegisteredTool>>,
    /// Names in registration order.
    order: Vec<String>,
}

/// Thread-safe registry of tools, keyed by exact name.
#[derive(Default)]
pub struct InMemoryToolRegistry {
    inner: RwLock<Inner>,
}

impl InMemoryToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        let inner = self.read();
        let mut tools_per_sensitivity = HashMap::new();
        for tool in inner.by_name.values() {
            *tools_per_sensitivity
                .entry(tool.descriptor.sensitivity)
                .or_insert(0) += 1;
        }
        RegistryStats {
            total_tools: inner.by_name.len(),
            tools_per_sensitivity,
        }
    }

    // A panic while holding the lock cannot leave `Inner` half-updated:
    // every mutation below is a single insert or remove pair.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Statistics about the registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub tools_per_sensitivity: HashMap<Sensitivity, usize>,
}

impl ToolRegistryPort for InMemoryToolRegistry {
    fn register(
        &self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> RuntimeResult<()> {
        descriptor
            .check()
            .map_err(|e| RuntimeError::validation(&descriptor.name, e))?;

        let mut inner = self.write();
        if inner.by_name.contains_key(&descriptor.name) {
            return Err(RuntimeError::DuplicateTool(descriptor.name));
        }

        tracing::debug!(
            tool = %descriptor.name,
            parameters = descriptor.parameters.len(),
            sensitivity = %descriptor.sensitivity,
            "Registered tool"
        );
        let name = descriptor.name.clone();
        inner.order.push(name.clone());
        inner
            .by_name
            .insert(name, Arc::new(RegisteredTool::new(descriptor, handler)));
        Ok(())
    }

    fn unregister(&self, name: &str) -> RuntimeResult<()> {
        let mut inner = self.write();
        if inner.by_name.remove(name).is_none() {
            return Err(RuntimeError::ToolNotFound(name.to_string()));
        }
        inner.order.retain(|n| n != name);
        tracing::debug!(tool = %name, "Unregistered tool");
        Ok(())
    }

    fn resolve(&self, name: &str) -> RuntimeResult<Arc<RegisteredTool>> {
        self.read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::ToolNotFound(name.to_string()))
    }

    fn discover(&self, filter: Option<ToolFilter>) -> Discovery {
        let inner = self.read();
        let snapshot = inner
            .order
            .iter()
            .filter_map(|name| inner.by_name.get(name).cloned())
            .collect();
        Discovery::new(snapshot, filter)
    }

    fn len(&self) -> usize {
        self.read().by_name.len()
    }
}

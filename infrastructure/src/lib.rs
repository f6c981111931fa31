//! Infrastructure layer for agent-runtime
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, configuration file loading, and the
//! assembly of a ready-to-use [`AgentRuntime`].

pub mod access;
pub mod config;
pub mod context;
pub mod logging;
pub mod memory;
pub mod runtime;
pub mod tools;

// Re-export commonly used types
pub use access::{AccessRule, PolicyAccessControl, RuleEffect};
pub use config::{ConfigLoadError, ConfigLoader, ConfigValidationError, FileConfig};
pub use context::{MemoryContextProvider, RegistryToolsProvider, StaticContextProvider};
pub use logging::{JsonlAuditLogger, init_tracing};
pub use memory::InMemoryMemoryRepository;
pub use runtime::AgentRuntime;
pub use tools::{InMemoryToolRegistry, RegistryStats};

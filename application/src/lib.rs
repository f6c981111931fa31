//! Application layer for agent-runtime
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AggregationParams, EngineParams, MemoryParams, RuntimeParams};
pub use ports::{
    access_control::{AccessControlPort, AllowAll, DenyAll},
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    context_provider::{ContextProvider, ProviderError},
    memory_repository::{MemoryRepository, RepositoryError, ensure_revision},
    tool_handler::{FnToolHandler, ToolFailure, ToolHandler},
    tool_registry::{Discovery, RegisteredTool, ToolRegistryPort},
    value_sealer::{PlainSealer, SealError, ValueSealer},
};
pub use use_cases::aggregate_context::ContextAggregator;
pub use use_cases::dispatch::{DispatchError, RuntimeDispatcher};
pub use use_cases::invoke_tool::InvocationEngine;
pub use use_cases::memory_store::{MemoryListing, MemoryStore};

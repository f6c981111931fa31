//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod access_control;
pub mod audit_logger;
pub mod context_provider;
pub mod memory_repository;
pub mod tool_handler;
pub mod tool_registry;
pub mod value_sealer;

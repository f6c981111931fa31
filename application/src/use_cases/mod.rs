//! Use cases (application services)

pub mod aggregate_context;
pub mod dispatch;
pub mod invoke_tool;
pub mod memory_store;

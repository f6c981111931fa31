//! Application-level configuration.
//!
//! Parameter structs that control how the use cases behave. They are plain
//! values built by the host (usually from the infrastructure config loader)
//! and handed to each use case at construction:
//!
//! - [`EngineParams`] - invocation engine defaults (timeout)
//! - [`AggregationParams`] - context aggregation defaults (provider timeout)
//! - [`MemoryParams`] - memory store write limits
//! - [`RuntimeParams`] - container for all three

pub mod params;

pub use params::{AggregationParams, EngineParams, MemoryParams, RuntimeParams};

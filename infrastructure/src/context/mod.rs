//! Context provider adapters
//!
//! Implementations of the [`ContextProvider`] port that ship with the
//! runtime. Host-specific providers (OS facts, git status, directory
//! listings) are supplied by the embedding application.
//!
//! # Components
//!
//! - [`RegistryToolsProvider`] - the `tools` slice, from the tool registry
//! - [`MemoryContextProvider`] - the `memory` slice, selected keys read as the caller
//! - [`StaticContextProvider`] - any slice, fixed at construction
//!
//! # Usage
//!
//! ```
//! use runtime_application::{AggregationParams, ContextAggregator};
//! use runtime_domain::context::ContextSlice;
//! use runtime_infrastructure::context::StaticContextProvider;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let aggregator = ContextAggregator::new(AggregationParams::default()).with_provider(Arc::new(
//!     StaticContextProvider::new("host", ContextSlice::System(json!({"os": "linux"}))),
//! ));
//! assert_eq!(aggregator.provider_ids(), vec!["host"]);
//! ```
//!
//! [`ContextProvider`]: runtime_application::ContextProvider

mod memory;
mod static_provider;
mod tools;

pub use memory::MemoryContextProvider;
pub use static_provider::StaticContextProvider;
pub use tools::RegistryToolsProvider;

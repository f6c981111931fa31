//! Tool domain module
//!
//! This module defines the core abstractions of the **Tool System**: how an
//! agent discovers capabilities and calls them in a validated,
//! access-controlled manner.
//!
//! # Overview
//!
//! Every tool is described by a [`ToolDescriptor`] (name, typed parameters,
//! return shape, constraints), invoked via an [`InvocationRequest`], and
//! finishes with an [`InvocationResult`] in a terminal
//! [`InvocationState`].
//!
//! ```text
//! ┌────────────────┐    ┌───────────────────┐    ┌──────────────────┐
//! │ ToolDescriptor │───▶│ InvocationRequest │───▶│ InvocationResult │
//! │ (registry)     │    │ (raw JSON args)   │    │ (terminal state) │
//! └───────┬────────┘    └─────────┬─────────┘    └──────────────────┘
//!         │                       │
//!         └── ToolValidator ──────┴──▶ ValidatedArgs (closed ArgValue variants)
//! ```
//!
//! # Typed Arguments
//!
//! Parameters declare a [`ParamType`] from a closed set. Validation converts
//! each raw JSON argument into the matching [`ArgValue`] variant and rejects
//! everything else, so tool implementations never see untyped input.
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions and validation, no I/O
//! - **Application** (`ToolHandler`, `ToolRegistryPort`, `InvocationEngine`):
//!   ports and the invocation pipeline
//! - **Infrastructure** (`InMemoryToolRegistry`): the concrete registry

pub mod entities;
pub mod invocation;
pub mod traits;
pub mod validation;
pub mod value_objects;

pub use entities::{
    Constraint, ParamType, ReturnSpec, ToolDescriptor, ToolFilter, ToolParameter, json_type_name,
};
pub use invocation::{IllegalTransition, InvocationState, InvocationTracker};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use validation::ValidationError;
pub use value_objects::{ArgValue, InvocationRequest, InvocationResult, ValidatedArgs};

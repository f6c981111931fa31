//! Access control adapters

mod policy;

pub use policy::{AccessRule, PolicyAccessControl, RuleEffect};

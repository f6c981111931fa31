//! Tool registry adapters

mod registry;

pub use registry::{InMemoryToolRegistry, RegistryStats};

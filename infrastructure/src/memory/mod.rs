//! Memory storage adapters
//!
//! Implementations of the [`MemoryRepository`](runtime_application::MemoryRepository)
//! port.

mod in_memory;

pub use in_memory::InMemoryMemoryRepository;

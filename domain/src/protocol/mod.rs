//! Message protocol
//!
//! Every interaction with the runtime is a [`MessageEnvelope`]. Requests
//! carry a [`RuntimeRequest`] payload; each request id yields exactly one
//! `response` or `error` envelope with the same id. Transport and byte
//! encoding are left to the host.

pub mod envelope;
pub mod request;

pub use envelope::{EnvelopeKind, ErrorPayload, MessageEnvelope};
pub use request::{RuntimeOperation, RuntimeRequest};

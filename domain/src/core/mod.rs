//! Core domain concepts shared across all subdomains.
//!
//! - [`error::RuntimeError`] - the error taxonomy surfaced to callers
//! - [`string::truncate`] - UTF-8 safe truncation for log previews

pub mod error;
pub mod string;

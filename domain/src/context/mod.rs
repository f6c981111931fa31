//! Context domain module
//!
//! A context bundle is a point-in-time snapshot of everything an agent can
//! see: host facts (`system`), the working tree (`workspace`), the caller
//! (`user`), the tools currently registered and selected memory entries.
//!
//! Bundles are assembled from [`ContextSlice`]s supplied by independent
//! providers. A provider that fails or times out leaves its slice empty and
//! marks the bundle partial; it never fails the aggregation as a whole.
//!
//! ```
//! use runtime_domain::context::{ContextBundleBuilder, ContextSlice, SliceKind};
//! use serde_json::json;
//!
//! let mut builder = ContextBundleBuilder::new([SliceKind::System, SliceKind::Workspace]);
//! builder.merge(ContextSlice::System(json!({"os": "linux"})));
//! builder.record_failure("git");
//!
//! let bundle = builder.build();
//! assert!(bundle.partial);
//! assert_eq!(bundle.failed_providers, vec!["git".to_string()]);
//! ```

pub mod entities;
pub mod value_objects;

pub use entities::{ContextBundle, ContextBundleBuilder};
pub use value_objects::{ContextSlice, SliceKind};

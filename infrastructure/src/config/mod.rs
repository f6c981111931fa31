//! Configuration file loading for agent-runtime
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENT_RUNTIME_*` environment variables
//! 2. Explicitly specified file
//! 3. Project root: `./agent-runtime.toml` or `./.agent-runtime.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-runtime/config.toml`
//! 5. Fallback: `~/.config/agent-runtime/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAccessConfig, FileAuditConfig, FileConfig, FileContextConfig,
    FileEngineConfig, FileMemoryConfig,
};
pub use loader::{ConfigLoadError, ConfigLoader};

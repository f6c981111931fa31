//! Configuration file loader with multi-source merging

use super::file_config::{ConfigValidationError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Project-level config file names, checked in order
const PROJECT_CONFIG_FILES: [&str; 2] = ["agent-runtime.toml", ".agent-runtime.toml"];

/// Environment variable prefix; `__` separates nested keys
/// (`AGENT_RUNTIME_ENGINE__DEFAULT_TIMEOUT_MS=5000`)
const ENV_PREFIX: &str = "AGENT_RUNTIME_";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AGENT_RUNTIME_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./agent-runtime.toml` or `./.agent-runtime.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/agent-runtime/config.toml`
    /// 5. Default values
    ///
    /// The merged result is validated before it is returned.
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigLoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!(path = %global_path.display(), "Merging global config");
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            debug!(path = %path.display(), "Merging project config");
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        Self::finish(figment)
    }

    /// Load a single file over the defaults, ignoring global, project and
    /// environment sources.
    pub fn load_file(path: &Path) -> Result<FileConfig, ConfigLoadError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path));
        let config: FileConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/agent-runtime/config.toml if set,
    /// otherwise falls back to ~/.config/agent-runtime/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agent-runtime").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn finish(figment: Figment) -> Result<FileConfig, ConfigLoadError> {
        let config: FileConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_domain::Sensitivity;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("agent-runtime.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.engine.default_timeout_ms, 30_000);
        assert_eq!(config.access.default_ceiling, Sensitivity::Internal);
        assert!(!config.audit.enabled);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("agent-runtime"));
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[engine]
default_timeout_ms = 750

[access]
default_ceiling = "confidential"
"#,
        );

        let config = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(config.engine.default_timeout_ms, 750);
        assert_eq!(config.access.default_ceiling, Sensitivity::Confidential);
        // Untouched sections keep their defaults
        assert_eq!(config.context.provider_timeout_ms, 2_000);
    }

    #[test]
    fn test_load_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[memory]
max_key_length = 0
"#,
        );

        let err = ConfigLoader::load_file(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid(ConfigValidationError::ZeroLimit(_))
        ));
    }

    #[test]
    fn test_load_file_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[engine\ndefault_timeout_ms = ");

        let err = ConfigLoader::load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Figment(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "explicit.toml",
                r#"
[engine]
default_timeout_ms = 750
"#,
            )?;
            jail.set_env("AGENT_RUNTIME_ENGINE__DEFAULT_TIMEOUT_MS", "1234");

            let path = PathBuf::from("explicit.toml");
            let config = ConfigLoader::load(Some(&path)).unwrap();
            assert_eq!(config.engine.default_timeout_ms, 1234);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_is_discovered() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                ".agent-runtime.toml",
                r#"
[context]
provider_timeout_ms = 300
"#,
            )?;

            assert_eq!(
                ConfigLoader::project_config_path(),
                Some(PathBuf::from(".agent-runtime.toml"))
            );
            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.context.provider_timeout_ms, 300);
            Ok(())
        });
    }
}

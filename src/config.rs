//! Configuration System
//!
//! Layered engine configuration: built-in defaults, then workspace files, then
//! environment variable overrides. Loaded values are validated as a whole.

use crate::error::EngineError;
use crate::logging::LoggingConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `VARIANT_ENGINE__ENGINE__CONCURRENCY=4`
pub const ENV_PREFIX: &str = "VARIANT_ENGINE";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scheduling settings
    #[serde(default)]
    pub engine: SchedulingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scheduling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Maximum number of concurrently executing variants
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Stop starting new variants after the first failure
    #[serde(default = "default_stop_on_first_error")]
    pub stop_on_first_error: bool,
}

fn default_concurrency() -> usize {
    1
}

fn default_stop_on_first_error() -> bool {
    true
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            stop_on_first_error: default_stop_on_first_error(),
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("Concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Engine(String),
    Logging(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Engine(msg) => write!(f, "Engine: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl EngineConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.engine.validate() {
            errors.push(ValidationError::Engine(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

/// Loads [`EngineConfig`] from defaults, files and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, `config/engine.toml`,
    /// `config/{VARIANT_ENGINE_ENV}.toml`, `VARIANT_ENGINE__*` environment.
    pub fn load(workspace_root: &Path) -> Result<EngineConfig, EngineError> {
        let builder = builder_with_defaults()?;
        let builder = add_workspace_files(builder, workspace_root);
        let builder = builder.add_source(environment());
        finish(builder)
    }

    /// Load a single file over the defaults; environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<EngineConfig, EngineError> {
        let builder = builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(environment());
        finish(builder)
    }

    /// Path of the base workspace config file
    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join("config").join("engine.toml")
    }

    /// Write the default configuration to `path`, creating parent directories.
    pub fn write_default(path: &Path) -> Result<(), EngineError> {
        let contents = EngineConfig::default().to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EngineError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }
        std::fs::write(path, contents).map_err(|e| {
            EngineError::ConfigError(format!("Failed to write config {:?}: {}", path, e))
        })
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, EngineError> {
    Ok(Config::builder()
        .set_default("engine.concurrency", default_concurrency() as i64)?
        .set_default("engine.stop_on_first_error", default_stop_on_first_error())?)
}

fn add_workspace_files(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let base_config_path = ConfigLoader::workspace_config_path(workspace_root);
    if base_config_path.exists() {
        builder = builder.add_source(File::from(base_config_path.as_path()).required(false));
    }

    let env_name = std::env::var("VARIANT_ENGINE_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = workspace_root
        .join("config")
        .join(format!("{}.toml", env_name));
    if env_config_path.exists() {
        builder = builder.add_source(File::from(env_config_path.as_path()).required(false));
    }

    builder
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<EngineConfig, EngineError> {
    let config: EngineConfig = builder.build()?.try_deserialize()?;

    config.validate().map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        EngineError::ConfigError(format!(
            "Configuration validation failed:\n{}",
            error_msgs.join("\n")
        ))
    })?;

    Ok(config)
}

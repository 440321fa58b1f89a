//! CLI command implementations.

pub mod check;
pub mod replay;

use std::path::Path;

use anyhow::{Context, Result};
use poolwatch_core::config::{ConfigLoader, Configurable, Validatable, WatchConfig};
use poolwatch_core::error::ConfigError;
use poolwatch_telemetry::logging::LogConfig;
use serde::Deserialize;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "POOLWATCH";

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Static watch configuration.
    pub watch: WatchConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,
}

impl AppConfig {
    /// Loads, overrides from the environment and validates `path`.
    pub fn load(path: &Path) -> Result<Self> {
        ConfigLoader::new()
            .with_env_prefix(ENV_PREFIX)
            .load_validated_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }
}

impl Validatable for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.watch.validate()
    }
}

impl Configurable for AppConfig {
    fn apply_env_overrides(&mut self, prefix: &str) {
        self.watch.apply_env_overrides(prefix);
    }

    fn env_var_names(prefix: &str) -> Vec<String> {
        WatchConfig::env_var_names(prefix)
    }
}

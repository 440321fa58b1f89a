//! Logging configuration, usually read from the `logging:` section of the
//! application config file.

use serde::{Deserialize, Serialize};

/// How and where poolwatch writes its logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `poolwatch_sync=debug,info`.
    pub level: String,
    /// Stdout format. Files are always JSON.
    pub format: LogFormat,
    /// Where records go.
    pub outputs: Vec<LogOutput>,
    /// Emit span enter/exit records (reconcile passes, transport calls).
    pub span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            outputs: vec![LogOutput::Stdout],
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Replaces the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Replaces the stdout format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Stdout record format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
}

/// Log destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    Stdout,
    /// Rolling `poolwatch.log` files under `path`.
    File {
        /// Directory, created if missing.
        path: String,
        /// When to start a new file.
        #[serde(default)]
        rotation: RotationConfig,
    },
}

/// File rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationConfig {
    /// New file every hour.
    Hourly,
    /// New file every day.
    #[default]
    Daily,
    /// Single file.
    Never,
}

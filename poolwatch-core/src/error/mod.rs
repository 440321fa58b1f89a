//! Error types and handling framework.
//!
//! The error system is organized hierarchically:
//! - `PoolwatchError` - Top-level error type
//!   - `WatchError` - Subscription lifecycle and notification errors
//!   - `TransportError` - Failures reported by the account watch transport
//!   - `DecodeError` - Pool payload decoding errors
//!   - `ConfigError` - Configuration errors
//!
//! Nothing in the subscription subsystem returns these from its public
//! entry points; they are reported to the error channel and logged.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error severity levels for categorizing errors.
///
/// - `Fatal`: Unrecoverable errors that require immediate attention
/// - `Recoverable`: Errors that can be retried or recovered from
/// - `Warning`: Non-critical issues that should be logged
/// - `Info`: Informational messages about expected conditions
///
/// # Examples
///
/// ```
/// use poolwatch_core::error::ErrorSeverity;
///
/// let severity = ErrorSeverity::Recoverable;
/// assert!(severity.is_recoverable());
/// assert!(!severity.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Unrecoverable error requiring immediate attention.
    Fatal,
    /// Error that can be recovered from through retry or fallback.
    #[default]
    Recoverable,
    /// Non-critical issue that should be logged.
    Warning,
    /// Informational message about an expected or handled condition.
    Info,
}

impl ErrorSeverity {
    /// Returns true if this error is recoverable (not fatal).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error is fatal (unrecoverable).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod config;
mod decode;
mod transport;
mod watch;

pub use config::ConfigError;
pub use decode::DecodeError;
pub use transport::TransportError;
pub use watch::WatchError;

pub use crate::types::ValidationError;

/// Top-level error type for poolwatch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolwatchError {
    /// Subscription lifecycle error.
    #[error("{0}")]
    Watch(#[from] WatchError),

    /// Transport error.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// Payload decoding error.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl PoolwatchError {
    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Watch(e) => e.severity(),
            Self::Transport(e) => e.severity(),
            Self::Decode(_) => ErrorSeverity::Warning,
            Self::Config(e) => e.severity(),
        }
    }

    /// Returns true if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the error category as a string.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Watch(_) => "watch",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Fatal.to_string(), "FATAL");
        assert_eq!(ErrorSeverity::default(), ErrorSeverity::Recoverable);
    }

    #[test]
    fn test_top_level_conversion() {
        let err: PoolwatchError = TransportError::Timeout { timeout_ms: 500 }.into();
        assert_eq!(err.category(), "transport");
        assert!(err.is_recoverable());

        let err: PoolwatchError = ConfigError::missing_field("pools").into();
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());
    }
}

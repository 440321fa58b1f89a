//! Account watch transport errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure returned by an account watch transport.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    /// The underlying connection is closed.
    #[error("[Transport] Connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the closure.
        reason: String,
    },

    /// The remote endpoint refused the request.
    #[error("[Transport] Request rejected: {reason}")]
    Rejected {
        /// Reason given by the endpoint.
        reason: String,
    },

    /// The request timed out.
    #[error("[Transport] Timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The handle does not refer to an open watch.
    #[error("[Transport] Unknown watch handle {handle}")]
    UnknownHandle {
        /// Raw handle value.
        handle: u64,
    },
}

impl TransportError {
    /// Returns true if retrying the request may succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConnectionClosed { .. } | Self::Timeout { .. })
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::ConnectionClosed { .. } | Self::Timeout { .. } => ErrorSeverity::Recoverable,
            Self::Rejected { .. } => ErrorSeverity::Warning,
            Self::UnknownHandle { .. } => ErrorSeverity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSeverity;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::ConnectionClosed {
            reason: "socket reset".to_string(),
        };
        assert!(err.to_string().contains("socket reset"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_transport_error_severity() {
        assert_eq!(
            TransportError::Timeout { timeout_ms: 10 }.severity(),
            ErrorSeverity::Recoverable
        );
        assert_eq!(
            TransportError::UnknownHandle { handle: 3 }.severity(),
            ErrorSeverity::Info
        );
    }
}

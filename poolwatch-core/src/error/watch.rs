//! Subscription lifecycle and notification errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ErrorSeverity, TransportError};
use crate::types::ResourceKey;

/// Error raised while opening, closing or serving an account watch.
///
/// None of these are business-fatal: they are converted into reported
/// events and the subscription subsystem keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchError {
    /// Opening a watch failed; the key is treated as not active.
    #[error("[Watch] Failed to open watch for {key}: {source}")]
    TransportOpen {
        /// Key the watch was requested for.
        key: ResourceKey,
        /// Transport failure.
        source: TransportError,
    },

    /// Closing a watch failed; local bookkeeping was cleared regardless.
    #[error("[Watch] Failed to close watch for {key}: {source}")]
    TransportClose {
        /// Key the watch belonged to.
        key: ResourceKey,
        /// Transport failure.
        source: TransportError,
    },

    /// A notification payload could not be decoded.
    #[error("[Watch] Malformed payload for {key}: {reason}")]
    MalformedPayload {
        /// Key the notification was delivered for.
        key: ResourceKey,
        /// Decoding failure.
        reason: String,
    },

    /// A second handler was offered for a key that is already watched.
    #[error("[Watch] Invariant violation for {key}: {reason}")]
    InvariantViolation {
        /// Key already being watched.
        key: ResourceKey,
        /// Description of the conflict.
        reason: String,
    },
}

impl WatchError {
    /// Creates an open failure.
    #[must_use]
    pub fn open(key: ResourceKey, source: TransportError) -> Self {
        Self::TransportOpen { key, source }
    }

    /// Creates a close failure.
    #[must_use]
    pub fn close(key: ResourceKey, source: TransportError) -> Self {
        Self::TransportClose { key, source }
    }

    /// Creates a malformed payload error.
    #[must_use]
    pub fn malformed(key: ResourceKey, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            key,
            reason: reason.into(),
        }
    }

    /// Creates a handler conflict error.
    #[must_use]
    pub fn handler_conflict(key: ResourceKey, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            key,
            reason: reason.into(),
        }
    }

    /// Returns the key the error concerns.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        match self {
            Self::TransportOpen { key, .. }
            | Self::TransportClose { key, .. }
            | Self::MalformedPayload { key, .. }
            | Self::InvariantViolation { key, .. } => key,
        }
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TransportOpen { .. } => ErrorSeverity::Recoverable,
            Self::TransportClose { .. } | Self::MalformedPayload { .. } => ErrorSeverity::Warning,
            Self::InvariantViolation { .. } => ErrorSeverity::Info,
        }
    }

    /// Returns true if the error came from the transport.
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::TransportOpen { .. } | Self::TransportClose { .. }
        )
    }
}

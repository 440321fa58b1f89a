//! Pool payload decoding errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to decode a raw pool account payload.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeError {
    /// Payload is not a valid pool document.
    #[error("[Decode] Invalid payload: {reason}")]
    InvalidJson {
        /// Parser message.
        reason: String,
    },

    /// A field decoded but holds an impossible value.
    #[error("[Decode] Invalid field '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl DecodeError {
    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidJson {
            reason: e.to_string(),
        }
    }
}

//! # Poolwatch Telemetry
//!
//! Logging and tracing for the poolwatch subscription manager.
//!
//! This crate provides:
//! - Structured logging with JSON and pretty formats
//! - Stdout and rolling file outputs
//! - Span helpers for reconciliation passes, notification dispatch and
//!   transport calls
//!
//! Library crates only emit events through `tracing` macros; the binary owns
//! subscriber installation through [`logging::init_logging`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Logging configuration and initialization
pub mod logging;

/// Span definitions for subscription tracing
pub mod spans;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, init_logging};
    pub use crate::spans::*;
}

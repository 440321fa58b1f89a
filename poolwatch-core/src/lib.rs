//! # Poolwatch Core
//!
//! Core types, errors and configuration for the poolwatch account
//! subscription manager.
//!
//! This crate provides:
//! - `NewType` wrappers for ledger identities (`ResourceKey`, `Pair`, `FeeTier`)
//! - The navigation/selection context read by the subscription subsystem
//! - Pool account payload decoding (`PoolState`)
//! - Error types and severity classification
//! - Configuration loading with YAML/TOML/JSON support and environment overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

/// Core type definitions and `NewType` wrappers
pub mod types;

/// Pool account payloads
pub mod data;

/// Error types and handling
pub mod error;

/// Configuration management
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::error::*;
    pub use crate::types::*;
}

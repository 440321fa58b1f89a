//! `NewType` wrappers and selection types.
//!
//! # Types
//!
//! - [`ResourceKey`] - Address of an independently watchable ledger account
//! - [`FeeTier`] - Pool fee tier (fee percent + tick spacing)
//! - [`Pair`] - Normalised, unordered token pair
//! - [`TradingPair`] - Ordered from/to selection made in the UI
//! - [`RoutePath`] - Current navigation route
//! - [`SelectionContext`] - Everything the subscription subsystem reads
//! - [`UpdateTarget`] / [`WatchCategory`] - Where notifications land and why a key is watched

mod fee_tier;
mod pair;
mod resource_key;
mod route;
mod selection;
mod target;

pub use fee_tier::FeeTier;
pub use pair::{Pair, TradingPair};
pub use resource_key::ResourceKey;
pub use route::RoutePath;
pub use selection::SelectionContext;
pub use target::{UpdateTarget, WatchCategory};

/// Validation error for `NewType` construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Resource key is empty
    #[error("resource key cannot be empty")]
    EmptyKey,

    /// Resource key is not a base58 account address
    #[error("invalid resource key: {0}")]
    InvalidKey(String),

    /// Both sides of a pair are the same token
    #[error("pair tokens must differ: {0}")]
    SamePair(String),

    /// Fee tier has a zero tick spacing or negative fee
    #[error("invalid fee tier: {0}")]
    InvalidFeeTier(String),
}

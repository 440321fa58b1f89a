//! Notification targets and watch categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-state slice a pool notification writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTarget {
    /// Swap-quote pool cache used by the exchange page.
    SwapPools,
    /// Pool state shown on the new-position page.
    PositionPools,
}

impl fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwapPools => write!(f, "swap_pools"),
            Self::PositionPools => write!(f, "position_pools"),
        }
    }
}

/// Why a key is in the desired set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchCategory {
    /// Pool of the selected trading pair at one fee tier.
    PairPool,
    /// Static two-hop routing pool.
    TwoHopPool,
    /// Pool selected on the new-position page.
    PositionPool,
    /// Auto-swap helper pool for the selected new-position pool.
    AutoSwapPool,
}

impl WatchCategory {
    /// Returns the state slice notifications for this category update.
    #[must_use]
    pub const fn target(self) -> UpdateTarget {
        match self {
            Self::PairPool | Self::TwoHopPool => UpdateTarget::SwapPools,
            Self::PositionPool | Self::AutoSwapPool => UpdateTarget::PositionPools,
        }
    }
}

impl fmt::Display for WatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PairPool => write!(f, "pair_pool"),
            Self::TwoHopPool => write!(f, "two_hop_pool"),
            Self::PositionPool => write!(f, "position_pool"),
            Self::AutoSwapPool => write!(f, "auto_swap_pool"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_targets() {
        assert_eq!(WatchCategory::PairPool.target(), UpdateTarget::SwapPools);
        assert_eq!(WatchCategory::TwoHopPool.target(), UpdateTarget::SwapPools);
        assert_eq!(WatchCategory::PositionPool.target(), UpdateTarget::PositionPools);
        assert_eq!(WatchCategory::AutoSwapPool.target(), UpdateTarget::PositionPools);
    }
}

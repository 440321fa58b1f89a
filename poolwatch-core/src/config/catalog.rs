//! Immutable pool lookups derived from [`WatchConfig`].

use std::collections::HashMap;

use super::watch_config::{PoolEntry, WatchConfig};
use crate::types::{FeeTier, Pair, ResourceKey};

/// Read-only view of the static pool data, shared behind an `Arc`.
///
/// Stands in for the SDK's pool address derivation: a pool for
/// `(pair, fee tier)` exists only if the directory lists it.
#[derive(Debug, Clone, Default)]
pub struct PoolCatalog {
    fee_tiers: Vec<FeeTier>,
    by_slot: HashMap<(Pair, FeeTier), ResourceKey>,
    by_address: HashMap<ResourceKey, PoolEntry>,
    auto_swap: HashMap<Pair, ResourceKey>,
    two_hop: Vec<ResourceKey>,
}

impl PoolCatalog {
    /// Builds the catalog. Entries with an invalid pair are skipped; run
    /// [`Validatable::validate`](super::Validatable::validate) first to reject them instead.
    #[must_use]
    pub fn from_config(config: &WatchConfig) -> Self {
        let mut catalog = Self {
            fee_tiers: config.fee_tiers.clone(),
            two_hop: config.two_hop_whitelist.clone(),
            ..Self::default()
        };

        for pool in &config.pools {
            if let Ok(pair) = pool.pair() {
                catalog
                    .by_slot
                    .entry((pair, pool.fee_tier))
                    .or_insert_with(|| pool.address.clone());
                catalog
                    .by_address
                    .entry(pool.address.clone())
                    .or_insert_with(|| pool.clone());
            }
        }
        for entry in &config.auto_swap_pools {
            if let Ok(pair) = entry.pair() {
                catalog
                    .auto_swap
                    .entry(pair)
                    .or_insert_with(|| entry.pool.clone());
            }
        }

        catalog
    }

    /// Returns the known fee tiers in configuration order.
    #[must_use]
    pub fn fee_tiers(&self) -> &[FeeTier] {
        &self.fee_tiers
    }

    /// Returns the pool serving `pair` at `tier`, if one exists.
    #[must_use]
    pub fn pool_for(&self, pair: &Pair, tier: &FeeTier) -> Option<&ResourceKey> {
        self.by_slot.get(&(pair.clone(), *tier))
    }

    /// Returns every pool of `pair` across all known fee tiers, in fee-tier order.
    #[must_use]
    pub fn pools_for_pair(&self, pair: &Pair) -> Vec<ResourceKey> {
        self.fee_tiers
            .iter()
            .filter_map(|tier| self.pool_for(pair, tier).cloned())
            .collect()
    }

    /// Looks up a pool by address.
    #[must_use]
    pub fn pool(&self, address: &ResourceKey) -> Option<&PoolEntry> {
        self.by_address.get(address)
    }

    /// Returns the auto-swap helper pool for `pair`, if configured.
    #[must_use]
    pub fn auto_swap_pool(&self, pair: &Pair) -> Option<&ResourceKey> {
        self.auto_swap.get(pair)
    }

    /// Returns the two-hop whitelist.
    #[must_use]
    pub fn two_hop_whitelist(&self) -> &[ResourceKey] {
        &self.two_hop
    }

    /// Returns the number of pools in the directory.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.by_address.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoSwapEntry, RouteConfig};
    use rust_decimal_macros::dec;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::new_unchecked(s)
    }

    fn config() -> WatchConfig {
        let low = FeeTier::new(dec!(0.05), 10).unwrap();
        let high = FeeTier::new(dec!(0.3), 60).unwrap();
        WatchConfig {
            routes: RouteConfig::default(),
            fee_tiers: vec![low, high],
            pools: vec![
                PoolEntry {
                    address: key("POOL_XY_HIGH"),
                    token_x: key("Y"),
                    token_y: key("X"),
                    fee_tier: high,
                },
                PoolEntry {
                    address: key("POOL_XY_LOW"),
                    token_x: key("X"),
                    token_y: key("Y"),
                    fee_tier: low,
                },
            ],
            two_hop_whitelist: vec![key("HOP")],
            auto_swap_pools: vec![AutoSwapEntry {
                token_x: key("Y"),
                token_y: key("X"),
                pool: key("HELPER"),
            }],
        }
    }

    #[test]
    fn test_pools_for_pair_in_tier_order() {
        let catalog = config().catalog();
        let pair = Pair::new(key("Y"), key("X")).unwrap();
        assert_eq!(
            catalog.pools_for_pair(&pair),
            vec![key("POOL_XY_LOW"), key("POOL_XY_HIGH")]
        );
        assert_eq!(catalog.pool_count(), 2);
    }

    #[test]
    fn test_unknown_pair_has_no_pools() {
        let catalog = config().catalog();
        let pair = Pair::new(key("X"), key("Z")).unwrap();
        assert!(catalog.pools_for_pair(&pair).is_empty());
        assert!(catalog.auto_swap_pool(&pair).is_none());
    }

    #[test]
    fn test_lookups() {
        let catalog = config().catalog();
        let pair = Pair::new(key("X"), key("Y")).unwrap();
        assert_eq!(catalog.auto_swap_pool(&pair), Some(&key("HELPER")));
        assert_eq!(catalog.two_hop_whitelist(), &[key("HOP")]);
        assert_eq!(
            catalog.pool(&key("POOL_XY_LOW")).map(|p| p.fee_tier.tick_spacing),
            Some(10)
        );
    }
}

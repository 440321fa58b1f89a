//! Desired-set computation.
//!
//! [`DesiredSetComputer::compute`] is a pure function of the selection
//! context and the static pool catalog: no I/O and no mutable state.

use poolwatch_core::config::{PoolCatalog, RouteConfig};
use poolwatch_core::types::{ResourceKey, SelectionContext, TradingPair, WatchCategory};
use std::collections::HashMap;
use std::sync::Arc;

/// One key that should be watched, with the category that claimed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredWatch {
    /// Account to watch.
    pub key: ResourceKey,
    /// Why it is wanted; decides the handler's update target.
    pub category: WatchCategory,
}

/// Insertion-ordered set of [`DesiredWatch`] entries, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredSet {
    entries: Vec<DesiredWatch>,
    index: HashMap<ResourceKey, usize>,
}

impl DesiredSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` unless already present. The first category to claim a key
    /// keeps it. Returns true if the key was added.
    pub fn insert(&mut self, key: ResourceKey, category: WatchCategory) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(DesiredWatch { key, category });
        true
    }

    /// Returns true if `key` is desired.
    #[must_use]
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the entry for `key`.
    #[must_use]
    pub fn get(&self, key: &ResourceKey) -> Option<&DesiredWatch> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Number of desired keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is desired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DesiredWatch> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.entries.iter().map(|w| &w.key)
    }

    /// Entries of `self` whose key is not in `other`, in insertion order.
    pub fn difference<'a>(&'a self, other: &'a DesiredSet) -> impl Iterator<Item = &'a DesiredWatch> {
        self.entries.iter().filter(|w| !other.contains(&w.key))
    }
}

impl<'a> IntoIterator for &'a DesiredSet {
    type Item = &'a DesiredWatch;
    type IntoIter = std::slice::Iter<'a, DesiredWatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Maps a [`SelectionContext`] to the [`DesiredSet`].
///
/// Categories are evaluated in a fixed order, which decides who claims a
/// key wanted twice:
/// 1. exchange page with a valid pair: the pair's pool at every known fee
///    tier, then the two-hop whitelist;
/// 2. new-position page with a pool selected: that pool, then its auto-swap
///    helper pool if the pair has one.
///
/// Inactive pages contribute nothing.
#[derive(Debug, Clone)]
pub struct DesiredSetComputer {
    routes: RouteConfig,
    catalog: Arc<PoolCatalog>,
}

impl DesiredSetComputer {
    /// Creates a computer over the static catalog.
    #[must_use]
    pub fn new(routes: RouteConfig, catalog: Arc<PoolCatalog>) -> Self {
        Self { routes, catalog }
    }

    /// Returns the catalog the computer reads.
    #[must_use]
    pub fn catalog(&self) -> &PoolCatalog {
        &self.catalog
    }

    /// Computes the desired set for `ctx`.
    #[must_use]
    pub fn compute(&self, ctx: &SelectionContext) -> DesiredSet {
        let mut desired = DesiredSet::new();
        self.add_trading(ctx, &mut desired);
        self.add_new_position(ctx, &mut desired);
        desired
    }

    fn add_trading(&self, ctx: &SelectionContext, desired: &mut DesiredSet) {
        if !ctx.route.is_within(&self.routes.exchange) {
            return;
        }
        let Some(pair) = ctx.trading_pair.as_ref().and_then(TradingPair::pair) else {
            return;
        };

        for pool in self.catalog.pools_for_pair(&pair) {
            desired.insert(pool, WatchCategory::PairPool);
        }
        for pool in self.catalog.two_hop_whitelist() {
            desired.insert(pool.clone(), WatchCategory::TwoHopPool);
        }
    }

    fn add_new_position(&self, ctx: &SelectionContext, desired: &mut DesiredSet) {
        if !ctx.route.is_within(&self.routes.new_position) {
            return;
        }
        let Some(pool) = ctx.new_position_pool.as_ref() else {
            return;
        };

        desired.insert(pool.clone(), WatchCategory::PositionPool);

        let helper = self
            .catalog
            .pool(pool)
            .and_then(|entry| entry.pair().ok())
            .and_then(|pair| self.catalog.auto_swap_pool(&pair));
        if let Some(helper) = helper {
            desired.insert(helper.clone(), WatchCategory::AutoSwapPool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolwatch_core::config::{AutoSwapEntry, PoolEntry, WatchConfig};
    use poolwatch_core::types::FeeTier;
    use rust_decimal_macros::dec;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::new_unchecked(s)
    }

    fn pool(address: &str, x: &str, y: &str, tier: FeeTier) -> PoolEntry {
        PoolEntry {
            address: key(address),
            token_x: key(x),
            token_y: key(y),
            fee_tier: tier,
        }
    }

    fn computer() -> DesiredSetComputer {
        let low = FeeTier::new(dec!(0.05), 10).unwrap();
        let high = FeeTier::new(dec!(0.3), 60).unwrap();
        let config = WatchConfig {
            routes: RouteConfig::default(),
            fee_tiers: vec![low, high],
            pools: vec![
                pool("XY_LOW", "X", "Y", low),
                pool("XY_HIGH", "X", "Y", high),
                pool("XZ_LOW", "Z", "X", low),
                pool("HOP1", "X", "W", low),
            ],
            two_hop_whitelist: vec![key("HOP1"), key("HOP2")],
            auto_swap_pools: vec![AutoSwapEntry {
                token_x: key("Y"),
                token_y: key("X"),
                pool: key("HELPER_XY"),
            }],
        };
        DesiredSetComputer::new(config.routes.clone(), Arc::new(config.catalog()))
    }

    fn keys(set: &DesiredSet) -> Vec<&str> {
        set.keys().map(ResourceKey::as_str).collect()
    }

    #[test]
    fn test_desired_set_dedup_first_claim_wins() {
        let mut set = DesiredSet::new();
        assert!(set.insert(key("A"), WatchCategory::PairPool));
        assert!(!set.insert(key("A"), WatchCategory::TwoHopPool));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&key("A")).unwrap().category, WatchCategory::PairPool);
    }

    #[test]
    fn test_difference_preserves_order() {
        let mut a = DesiredSet::new();
        let mut b = DesiredSet::new();
        for k in ["A", "B", "C"] {
            a.insert(key(k), WatchCategory::PairPool);
        }
        b.insert(key("B"), WatchCategory::PairPool);
        let diff: Vec<&str> = a.difference(&b).map(|w| w.key.as_str()).collect();
        assert_eq!(diff, vec!["A", "C"]);
    }

    #[test]
    fn test_trading_page_pair_pools_then_whitelist() {
        let ctx = SelectionContext::on_route("/exchange").with_pair(key("Y"), key("X"));
        let desired = computer().compute(&ctx);
        assert_eq!(keys(&desired), vec!["XY_LOW", "XY_HIGH", "HOP1", "HOP2"]);
        assert_eq!(
            desired.get(&key("HOP1")).unwrap().category,
            WatchCategory::TwoHopPool
        );
    }

    #[test]
    fn test_pair_pool_also_whitelisted_is_claimed_by_pair() {
        let ctx = SelectionContext::on_route("/exchange/X/W").with_pair(key("X"), key("W"));
        let desired = computer().compute(&ctx);
        assert_eq!(keys(&desired), vec!["HOP1", "HOP2"]);
        assert_eq!(
            desired.get(&key("HOP1")).unwrap().category,
            WatchCategory::PairPool
        );
    }

    #[test]
    fn test_trading_page_without_valid_pair_is_empty() {
        let c = computer();
        assert!(c.compute(&SelectionContext::on_route("/exchange")).is_empty());
        let same = SelectionContext::on_route("/exchange").with_pair(key("X"), key("X"));
        assert!(c.compute(&same).is_empty());
    }

    #[test]
    fn test_inactive_pages_are_empty() {
        let ctx = SelectionContext::on_route("/statistics")
            .with_pair(key("X"), key("Y"))
            .with_position_pool(key("XY_LOW"));
        assert!(computer().compute(&ctx).is_empty());
    }

    #[test]
    fn test_new_position_with_helper() {
        let ctx = SelectionContext::on_route("/newPosition").with_position_pool(key("XY_HIGH"));
        let desired = computer().compute(&ctx);
        assert_eq!(keys(&desired), vec!["XY_HIGH", "HELPER_XY"]);
        assert_eq!(
            desired.get(&key("HELPER_XY")).unwrap().category.target(),
            poolwatch_core::types::UpdateTarget::PositionPools
        );
    }

    #[test]
    fn test_new_position_without_helper_or_unknown_pool() {
        let c = computer();
        let ctx = SelectionContext::on_route("/newPosition").with_position_pool(key("XZ_LOW"));
        assert_eq!(keys(&c.compute(&ctx)), vec!["XZ_LOW"]);

        let ctx = SelectionContext::on_route("/newPosition").with_position_pool(key("UNLISTED"));
        assert_eq!(keys(&c.compute(&ctx)), vec!["UNLISTED"]);

        assert!(c.compute(&SelectionContext::on_route("/newPosition")).is_empty());
    }
}

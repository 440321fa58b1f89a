//! Application state store seam.

use dashmap::DashMap;
use poolwatch_core::data::PoolState;
use poolwatch_core::types::{ResourceKey, UpdateTarget};

/// Receives decoded pool updates, one call per notification.
pub trait PoolStateStore: Send + Sync {
    /// Writes the latest state of `key` into the `target` slice.
    fn update_pool_state(&self, target: UpdateTarget, key: &ResourceKey, state: PoolState);
}

#[derive(Debug, Clone)]
struct StoredPool {
    state: PoolState,
    updates: u64,
}

/// Concurrent in-memory store keeping the latest state per `(target, key)`.
#[derive(Debug, Default)]
pub struct InMemoryPoolStore {
    pools: DashMap<(UpdateTarget, ResourceKey), StoredPool>,
}

impl InMemoryPoolStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest state of `key` in `target`.
    #[must_use]
    pub fn get(&self, target: UpdateTarget, key: &ResourceKey) -> Option<PoolState> {
        self.pools
            .get(&(target, key.clone()))
            .map(|entry| entry.state.clone())
    }

    /// Number of updates applied to `key` in `target`.
    #[must_use]
    pub fn update_count(&self, target: UpdateTarget, key: &ResourceKey) -> u64 {
        self.pools
            .get(&(target, key.clone()))
            .map_or(0, |entry| entry.updates)
    }

    /// Keys present in `target`, sorted.
    #[must_use]
    pub fn keys(&self, target: UpdateTarget) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self
            .pools
            .iter()
            .filter(|entry| entry.key().0 == target)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Total number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl PoolStateStore for InMemoryPoolStore {
    fn update_pool_state(&self, target: UpdateTarget, key: &ResourceKey, state: PoolState) {
        self.pools
            .entry((target, key.clone()))
            .and_modify(|stored| {
                stored.state = state.clone();
                stored.updates += 1;
            })
            .or_insert(StoredPool { state, updates: 1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolwatch_core::types::FeeTier;
    use rust_decimal_macros::dec;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::new_unchecked(s)
    }

    fn state(slot: u64) -> PoolState {
        PoolState {
            token_x: key("X"),
            token_y: key("Y"),
            fee_tier: FeeTier::new(dec!(0.05), 10).unwrap(),
            sqrt_price: 1 << 64,
            current_tick_index: 0,
            liquidity: 1_000,
            fee_protocol_token_x: 0,
            fee_protocol_token_y: 0,
            last_timestamp: 0,
            slot,
        }
    }

    #[test]
    fn test_latest_state_wins() {
        let store = InMemoryPoolStore::new();
        store.update_pool_state(UpdateTarget::SwapPools, &key("P"), state(1));
        store.update_pool_state(UpdateTarget::SwapPools, &key("P"), state(2));

        assert_eq!(store.get(UpdateTarget::SwapPools, &key("P")).unwrap().slot, 2);
        assert_eq!(store.update_count(UpdateTarget::SwapPools, &key("P")), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_targets_are_separate() {
        let store = InMemoryPoolStore::new();
        store.update_pool_state(UpdateTarget::PositionPools, &key("P"), state(1));

        assert!(store.get(UpdateTarget::SwapPools, &key("P")).is_none());
        assert_eq!(store.keys(UpdateTarget::PositionPools), vec![key("P")]);
        assert!(store.keys(UpdateTarget::SwapPools).is_empty());
    }
}

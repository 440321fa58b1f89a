//! Notification dispatch.
//!
//! Decodes raw change notifications and writes them into the state store.
//! Runs inside the transport's callback path, so it never panics and never
//! returns errors: malformed payloads are logged and dropped.

use poolwatch_core::data::PoolState;
use poolwatch_core::error::WatchError;
use poolwatch_core::types::{ResourceKey, UpdateTarget};
use poolwatch_telemetry::spans::dispatch_span;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

use crate::store::PoolStateStore;
use crate::transport::NotificationHandler;

/// Counters of dispatched notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Notifications written to the store.
    pub applied: u64,
    /// Malformed notifications dropped.
    pub dropped: u64,
}

/// Turns notifications into store writes.
pub struct NotificationDispatcher {
    store: Arc<dyn PoolStateStore>,
    applied: AtomicU64,
    dropped: AtomicU64,
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl NotificationDispatcher {
    /// Creates a dispatcher writing into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PoolStateStore>) -> Self {
        Self {
            store,
            applied: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Decodes `payload` and performs a single store write.
    ///
    /// Returns false if the payload was dropped.
    pub fn dispatch(&self, key: &ResourceKey, target: UpdateTarget, payload: &[u8]) -> bool {
        let span = dispatch_span(key.as_str(), &target.to_string());
        let _guard = span.enter();

        match PoolState::decode(payload) {
            Ok(state) => {
                trace!(slot = state.slot, "Applying pool update");
                self.store.update_pool_state(target, key, state);
                self.applied.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                let error = WatchError::malformed(key.clone(), e.to_string());
                warn!(key = %key, error = %error, "Dropping malformed notification");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Builds the transport callback for `key`.
    #[must_use]
    pub fn handler(self: &Arc<Self>, key: ResourceKey, target: UpdateTarget) -> NotificationHandler {
        let dispatcher = Arc::clone(self);
        NotificationHandler::new(target, move |payload| {
            dispatcher.dispatch(&key, target, payload);
        })
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            applied: self.applied.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryPoolStore;

    const POOL: &str = "9vqYJjDUFecLL2xPUC4Rc7hyCtZ6iJ4mDiVZX7aFXoAe";

    fn payload(slot: u64) -> Vec<u8> {
        format!(
            r#"{{"token_x":"So11111111111111111111111111111111111111112","token_y":"EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v","fee":"0.05","tick_spacing":10,"sqrt_price":"7469508197693385745","current_tick_index":-18867,"liquidity":"4839928384","slot":{slot}}}"#
        )
        .into_bytes()
    }

    fn setup() -> (Arc<InMemoryPoolStore>, Arc<NotificationDispatcher>) {
        let store = Arc::new(InMemoryPoolStore::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(store.clone()));
        (store, dispatcher)
    }

    #[test]
    fn test_dispatch_writes_store() {
        let (store, dispatcher) = setup();
        let key = ResourceKey::new_unchecked(POOL);

        assert!(dispatcher.dispatch(&key, UpdateTarget::SwapPools, &payload(5)));
        assert_eq!(store.get(UpdateTarget::SwapPools, &key).unwrap().slot, 5);
        assert_eq!(dispatcher.stats(), DispatchStats { applied: 1, dropped: 0 });
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let (store, dispatcher) = setup();
        let key = ResourceKey::new_unchecked(POOL);

        assert!(!dispatcher.dispatch(&key, UpdateTarget::SwapPools, b"not json"));
        assert!(!dispatcher.dispatch(&key, UpdateTarget::SwapPools, br#"{"token_x":1}"#));
        assert!(store.is_empty());
        assert_eq!(dispatcher.stats().dropped, 2);
    }

    #[test]
    fn test_handler_routes_to_target() {
        let (store, dispatcher) = setup();
        let key = ResourceKey::new_unchecked(POOL);

        let handler = dispatcher.handler(key.clone(), UpdateTarget::PositionPools);
        handler.notify(&payload(1));
        handler.notify(&payload(2));

        assert_eq!(handler.target(), UpdateTarget::PositionPools);
        assert_eq!(store.update_count(UpdateTarget::PositionPools, &key), 2);
        assert_eq!(store.get(UpdateTarget::PositionPools, &key).unwrap().slot, 2);
    }
}

//! Active watch bookkeeping.
//!
//! The [`SubscriptionRegistry`] owns every [`WatchHandle`] and is the only
//! component that calls the [`AccountWatchService`]. It maintains one
//! invariant: at most one watch per [`ResourceKey`].
//!
//! Bookkeeping is updated synchronously and optimistically; transport calls
//! run on spawned tasks and are never awaited by `ensure`/`release`. A key
//! released while its `watch` is still pending is closed as soon as the
//! handle arrives.

use parking_lot::Mutex;
use poolwatch_core::error::{TransportError, WatchError};
use poolwatch_core::types::{ResourceKey, UpdateTarget};
use poolwatch_telemetry::spans::transport_span;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::report::ErrorReporter;
use crate::transport::{AccountWatchService, NotificationHandler, WatchHandle};

/// Transport state of one registered key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "handle", rename_all = "snake_case")]
pub enum SubscriptionState {
    /// `watch` issued, handle not yet returned.
    Opening,
    /// Watch open.
    Open(WatchHandle),
}

/// Snapshot of one registered subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSubscription {
    /// Watched key.
    pub key: ResourceKey,
    /// State slice its handler writes.
    pub target: UpdateTarget,
    /// Transport state.
    pub state: SubscriptionState,
}

#[derive(Debug)]
struct WatchSlot {
    generation: u64,
    target: UpdateTarget,
    handle: Option<WatchHandle>,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<ResourceKey, WatchSlot>,
    next_generation: u64,
}

/// Idempotent open/close of account watches.
///
/// `ensure`, `release` and `release_all` spawn onto the current tokio
/// runtime. Outside one, the transport call is not made and the failure goes
/// to the error reporter.
pub struct SubscriptionRegistry {
    service: Arc<dyn AccountWatchService>,
    reporter: Arc<dyn ErrorReporter>,
    state: Arc<Mutex<RegistryState>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("active", &self.len())
            .field("in_flight", &self.in_flight.lock().len())
            .finish_non_exhaustive()
    }
}

impl SubscriptionRegistry {
    /// Creates an empty registry over `service`.
    #[must_use]
    pub fn new(service: Arc<dyn AccountWatchService>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            service,
            reporter,
            state: Arc::new(Mutex::new(RegistryState::default())),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Opens a watch on `key` unless one is already registered.
    ///
    /// An existing registration is never replaced: the first handler stays
    /// authoritative until the key is released. Returns true if a new watch
    /// was requested.
    pub fn ensure(&self, key: ResourceKey, handler: NotificationHandler) -> bool {
        let generation = {
            let mut state = self.state.lock();
            if let Some(slot) = state.entries.get(&key) {
                if slot.target == handler.target() {
                    debug!(key = %key, "Watch already registered");
                } else {
                    let conflict = WatchError::handler_conflict(
                        key.clone(),
                        format!(
                            "registered for {}, ignoring handler for {}",
                            slot.target,
                            handler.target()
                        ),
                    );
                    debug!(key = %key, error = %conflict, "Ignoring second handler");
                }
                return false;
            }

            let generation = state.next_generation;
            state.next_generation += 1;
            state.entries.insert(
                key.clone(),
                WatchSlot {
                    generation,
                    target: handler.target(),
                    handle: None,
                },
            );
            generation
        };

        debug!(key = %key, target = %handler.target(), "Opening watch");
        let span = transport_span("watch", key.as_str());
        let opened = self.spawn_tracked(
            open_watch(
                Arc::clone(&self.service),
                Arc::clone(&self.reporter),
                Arc::clone(&self.state),
                key.clone(),
                generation,
                handler,
            )
            .instrument(span),
        );
        if let Err(source) = opened {
            {
                let mut state = self.state.lock();
                if state
                    .entries
                    .get(&key)
                    .is_some_and(|slot| slot.generation == generation)
                {
                    state.entries.remove(&key);
                }
            }
            self.reporter
                .report_transport_error(&WatchError::open(key, source));
            return false;
        }
        true
    }

    /// Closes the watch on `key`, if any.
    ///
    /// Bookkeeping is cleared immediately whether or not the transport call
    /// later succeeds. Returns true if the key was registered.
    pub fn release(&self, key: &ResourceKey) -> bool {
        let slot = self.state.lock().entries.remove(key);
        match slot {
            None => false,
            Some(WatchSlot {
                handle: Some(handle),
                ..
            }) => {
                self.spawn_close(key.clone(), handle);
                true
            }
            Some(WatchSlot { handle: None, .. }) => {
                debug!(key = %key, "Release queued until watch resolves");
                true
            }
        }
    }

    /// Releases every registered key. Returns how many were registered.
    pub fn release_all(&self) -> usize {
        let drained: Vec<(ResourceKey, WatchSlot)> = self.state.lock().entries.drain().collect();
        let count = drained.len();
        for (key, slot) in drained {
            if let Some(handle) = slot.handle {
                self.spawn_close(key, handle);
            }
        }
        if count > 0 {
            info!(released = count, "Released all watches");
        }
        count
    }

    /// Returns true if `key` is registered (opening or open).
    #[must_use]
    pub fn has(&self, key: &ResourceKey) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Returns the handle of `key` once its watch is open.
    #[must_use]
    pub fn handle(&self, key: &ResourceKey) -> Option<WatchHandle> {
        self.state.lock().entries.get(key).and_then(|s| s.handle)
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self.state.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Point-in-time view of every registration, sorted by key.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ActiveSubscription> {
        let mut subs: Vec<ActiveSubscription> = self
            .state
            .lock()
            .entries
            .iter()
            .map(|(key, slot)| ActiveSubscription {
                key: key.clone(),
                target: slot.target,
                state: slot
                    .handle
                    .map_or(SubscriptionState::Opening, SubscriptionState::Open),
            })
            .collect();
        subs.sort_by(|a, b| a.key.cmp(&b.key));
        subs
    }

    /// Waits until every transport call issued so far, and any close it
    /// triggers, has completed.
    pub async fn settle(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.in_flight.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    warn!(error = %e, "Transport task failed");
                }
            }
        }
    }

    fn spawn_close(&self, key: ResourceKey, handle: WatchHandle) {
        debug!(key = %key, handle = %handle, "Closing watch");
        let span = transport_span("unwatch", key.as_str());
        let closed = self.spawn_tracked(
            close_watch(
                Arc::clone(&self.service),
                Arc::clone(&self.reporter),
                key.clone(),
                handle,
            )
            .instrument(span),
        );
        if let Err(source) = closed {
            self.reporter
                .report_transport_error(&WatchError::close(key, source));
        }
    }

    fn spawn_tracked<F>(&self, future: F) -> Result<(), TransportError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| TransportError::ConnectionClosed {
            reason: format!("no async runtime: {e}"),
        })?;
        let task = runtime.spawn(future);
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|t| !t.is_finished());
        in_flight.push(task);
        Ok(())
    }
}

async fn open_watch(
    service: Arc<dyn AccountWatchService>,
    reporter: Arc<dyn ErrorReporter>,
    state: Arc<Mutex<RegistryState>>,
    key: ResourceKey,
    generation: u64,
    handler: NotificationHandler,
) {
    match service.watch(key.clone(), handler).await {
        Ok(handle) => {
            let current = {
                let mut state = state.lock();
                match state.entries.get_mut(&key) {
                    Some(slot) if slot.generation == generation => {
                        slot.handle = Some(handle);
                        true
                    }
                    _ => false,
                }
            };
            if current {
                info!(key = %key, handle = %handle, "Watch opened");
            } else {
                debug!(key = %key, handle = %handle, "Watch resolved after release, closing");
                close_watch(service, reporter, key, handle).await;
            }
        }
        Err(source) => {
            {
                let mut state = state.lock();
                if state
                    .entries
                    .get(&key)
                    .is_some_and(|slot| slot.generation == generation)
                {
                    state.entries.remove(&key);
                }
            }
            reporter.report_transport_error(&WatchError::open(key, source));
        }
    }
}

async fn close_watch(
    service: Arc<dyn AccountWatchService>,
    reporter: Arc<dyn ErrorReporter>,
    key: ResourceKey,
    handle: WatchHandle,
) {
    match service.unwatch(handle).await {
        Ok(()) => debug!(key = %key, handle = %handle, "Watch closed"),
        Err(source) => reporter.report_transport_error(&WatchError::close(key, source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ChannelReporter;
    use crate::transport::InMemoryWatchService;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::new_unchecked(s)
    }

    fn handler(target: UpdateTarget) -> NotificationHandler {
        NotificationHandler::new(target, |_| {})
    }

    fn setup() -> (Arc<InMemoryWatchService>, ChannelReporter, SubscriptionRegistry) {
        let service = Arc::new(InMemoryWatchService::new());
        let reporter = ChannelReporter::new(16);
        let registry = SubscriptionRegistry::new(service.clone(), Arc::new(reporter.clone()));
        (service, reporter, registry)
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let (service, _, registry) = setup();

        assert!(registry.ensure(key("A"), handler(UpdateTarget::SwapPools)));
        assert!(!registry.ensure(key("A"), handler(UpdateTarget::SwapPools)));
        registry.settle().await;

        assert_eq!(service.watch_count(&key("A")), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.handle(&key("A")).is_some());
    }

    #[tokio::test]
    async fn test_second_handler_is_ignored() {
        let (service, _, registry) = setup();

        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));
        assert!(!registry.ensure(key("A"), handler(UpdateTarget::PositionPools)));
        registry.settle().await;

        assert_eq!(service.watch_count(&key("A")), 1);
        assert_eq!(registry.snapshot()[0].target, UpdateTarget::SwapPools);
    }

    #[tokio::test]
    async fn test_release_missing_key_is_noop() {
        let (service, _, registry) = setup();
        assert!(!registry.release(&key("A")));
        registry.settle().await;
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_release_closes_open_watch() {
        let (service, _, registry) = setup();

        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));
        registry.settle().await;
        assert!(registry.release(&key("A")));
        registry.settle().await;

        assert!(!registry.has(&key("A")));
        assert_eq!(service.unwatch_count(&key("A")), 1);
        assert!(!service.is_open(&key("A")));
    }

    #[tokio::test]
    async fn test_release_before_watch_resolves() {
        let (service, _, registry) = setup();
        service.pause();

        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));
        assert_eq!(
            registry.snapshot()[0].state,
            SubscriptionState::Opening
        );
        registry.release(&key("A"));
        assert!(!registry.has(&key("A")));

        service.resume();
        registry.settle().await;

        assert_eq!(service.watch_count(&key("A")), 1);
        assert_eq!(service.unwatch_count(&key("A")), 1);
        assert!(!service.is_open(&key("A")));
    }

    #[tokio::test]
    async fn test_reensure_while_stale_watch_pending() {
        let (service, _, registry) = setup();
        service.pause();

        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));
        registry.release(&key("A"));
        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));

        service.resume();
        registry.settle().await;

        assert_eq!(service.watch_count(&key("A")), 2);
        assert_eq!(service.unwatch_count(&key("A")), 1);
        assert_eq!(service.open_count(), 1);
        assert!(registry.handle(&key("A")).is_some());
    }

    #[tokio::test]
    async fn test_open_failure_clears_slot_and_reports() {
        let (service, reporter, registry) = setup();
        let mut errors = reporter.subscribe();
        service.fail_watch_for(key("A"));

        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));
        registry.settle().await;

        assert!(!registry.has(&key("A")));
        let err = errors.try_recv().unwrap();
        assert!(matches!(
            err,
            WatchError::TransportOpen {
                source: TransportError::Rejected { .. },
                ..
            }
        ));

        service.clear_failures();
        assert!(registry.ensure(key("A"), handler(UpdateTarget::SwapPools)));
        registry.settle().await;
        assert!(service.is_open(&key("A")));
    }

    #[tokio::test]
    async fn test_close_failure_still_clears_bookkeeping() {
        let (service, reporter, registry) = setup();
        let mut errors = reporter.subscribe();

        registry.ensure(key("A"), handler(UpdateTarget::SwapPools));
        registry.settle().await;
        service.fail_unwatch(true);
        registry.release(&key("A"));
        registry.settle().await;

        assert!(!registry.has(&key("A")));
        assert!(matches!(
            errors.try_recv().unwrap(),
            WatchError::TransportClose { .. }
        ));
    }

    #[tokio::test]
    async fn test_release_all_empties_registry() {
        let (service, _, registry) = setup();
        for k in ["A", "B", "C"] {
            registry.ensure(key(k), handler(UpdateTarget::SwapPools));
        }
        registry.settle().await;

        assert_eq!(registry.release_all(), 3);
        registry.settle().await;

        assert!(registry.is_empty());
        assert!(registry.keys().is_empty());
        assert_eq!(service.open_count(), 0);
    }

    #[test]
    fn test_ensure_without_runtime_reports_instead_of_panicking() {
        let (service, reporter, registry) = setup();
        let mut errors = reporter.subscribe();

        assert!(!registry.ensure(key("A"), handler(UpdateTarget::SwapPools)));

        assert!(!registry.has(&key("A")));
        assert!(service.calls().is_empty());
        assert!(matches!(
            errors.try_recv().unwrap(),
            WatchError::TransportOpen {
                source: TransportError::ConnectionClosed { .. },
                ..
            }
        ));
        assert!(!registry.release(&key("A")));
        assert_eq!(registry.release_all(), 0);
    }
}

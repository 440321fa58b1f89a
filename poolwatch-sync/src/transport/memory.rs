//! In-process account watch transport.
//!
//! Used by the scenario tests and the `poolwatch replay` command. It keeps
//! the open watches in memory, records every call, and lets callers hold
//! `watch` resolution or inject failures.

use async_trait::async_trait;
use parking_lot::Mutex;
use poolwatch_core::error::TransportError;
use poolwatch_core::types::ResourceKey;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, trace};

use super::{AccountWatchService, NotificationHandler, WatchHandle};

/// One recorded transport call, in issue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum TransportCall {
    /// `watch(key)` was called.
    Watch {
        /// Requested key.
        key: ResourceKey,
    },
    /// `unwatch(handle)` was called.
    Unwatch {
        /// Handle passed in.
        handle: WatchHandle,
        /// Key the handle belonged to, if it was known.
        key: Option<ResourceKey>,
    },
}

#[derive(Debug)]
struct OpenWatch {
    key: ResourceKey,
    handler: NotificationHandler,
}

#[derive(Debug, Default)]
struct ServiceState {
    // Ordered by handle, i.e. by open order.
    open: BTreeMap<WatchHandle, OpenWatch>,
    calls: Vec<TransportCall>,
    failing_keys: HashSet<ResourceKey>,
    fail_unwatch: bool,
}

/// In-memory [`AccountWatchService`].
#[derive(Debug)]
pub struct InMemoryWatchService {
    state: Mutex<ServiceState>,
    paused: watch::Sender<bool>,
    next_handle: AtomicU64,
}

impl Default for InMemoryWatchService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWatchService {
    /// Creates a service with no open watches.
    #[must_use]
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            state: Mutex::new(ServiceState::default()),
            paused,
            next_handle: AtomicU64::new(1),
        }
    }

    /// Holds every `watch` call after it is recorded until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Lets held `watch` calls resolve.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Makes `watch` fail for `key` until [`clear_failures`](Self::clear_failures).
    pub fn fail_watch_for(&self, key: ResourceKey) {
        self.state.lock().failing_keys.insert(key);
    }

    /// Makes every `unwatch` fail. The remote watch stays open, as a stray
    /// watch would on a real endpoint.
    pub fn fail_unwatch(&self, fail: bool) {
        self.state.lock().fail_unwatch = fail;
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failing_keys.clear();
        state.fail_unwatch = false;
    }

    /// Delivers `payload` to every open watch on `key`, in open order.
    ///
    /// Handlers run outside the internal lock. Returns the number of
    /// handlers invoked.
    pub fn emit(&self, key: &ResourceKey, payload: &[u8]) -> usize {
        let handlers: Vec<NotificationHandler> = self
            .state
            .lock()
            .open
            .values()
            .filter(|w| &w.key == key)
            .map(|w| w.handler.clone())
            .collect();

        for handler in &handlers {
            handler.notify(payload);
        }
        trace!(key = %key, handlers = handlers.len(), "Emitted notification");
        handlers.len()
    }

    /// Returns every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&self) -> Vec<TransportCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// Number of `watch` calls issued for `key`.
    #[must_use]
    pub fn watch_count(&self, key: &ResourceKey) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, TransportCall::Watch { key: k } if k == key))
            .count()
    }

    /// Number of `unwatch` calls issued for handles of `key`.
    #[must_use]
    pub fn unwatch_count(&self, key: &ResourceKey) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, TransportCall::Unwatch { key: Some(k), .. } if k == key))
            .count()
    }

    /// Keys with at least one open watch, in open order, deduplicated.
    #[must_use]
    pub fn open_keys(&self) -> Vec<ResourceKey> {
        let state = self.state.lock();
        let mut seen = HashSet::new();
        state
            .open
            .values()
            .filter(|w| seen.insert(w.key.clone()))
            .map(|w| w.key.clone())
            .collect()
    }

    /// Number of open watches, counting duplicates.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.lock().open.len()
    }

    /// Returns true if `key` has an open watch.
    #[must_use]
    pub fn is_open(&self, key: &ResourceKey) -> bool {
        self.state.lock().open.values().any(|w| &w.key == key)
    }
}

#[async_trait]
impl AccountWatchService for InMemoryWatchService {
    async fn watch(
        &self,
        key: ResourceKey,
        handler: NotificationHandler,
    ) -> Result<WatchHandle, TransportError> {
        self.state
            .lock()
            .calls
            .push(TransportCall::Watch { key: key.clone() });

        let mut paused = self.paused.subscribe();
        if paused.wait_for(|held| !*held).await.is_err() {
            return Err(TransportError::ConnectionClosed {
                reason: "service dropped".to_string(),
            });
        }

        let mut state = self.state.lock();
        if state.failing_keys.contains(&key) {
            return Err(TransportError::Rejected {
                reason: format!("watch refused for {key}"),
            });
        }

        let handle = WatchHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        debug!(key = %key, handle = %handle, "Opened in-memory watch");
        state.open.insert(handle, OpenWatch { key, handler });
        Ok(handle)
    }

    async fn unwatch(&self, handle: WatchHandle) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let key = state.open.get(&handle).map(|w| w.key.clone());
        state.calls.push(TransportCall::Unwatch {
            handle,
            key: key.clone(),
        });

        if key.is_none() {
            return Err(TransportError::UnknownHandle {
                handle: handle.as_u64(),
            });
        }
        if state.fail_unwatch {
            return Err(TransportError::ConnectionClosed {
                reason: "unwatch failed".to_string(),
            });
        }

        state.open.remove(&handle);
        debug!(handle = %handle, "Closed in-memory watch");
        Ok(())
    }
}

//! Account watch transport seam.
//!
//! The publish/subscribe connection to the ledger is an external
//! collaborator. Only [`SubscriptionRegistry`](crate::SubscriptionRegistry)
//! talks to it.

mod memory;

pub use memory::{InMemoryWatchService, TransportCall};

use async_trait::async_trait;
use poolwatch_core::error::TransportError;
use poolwatch_core::types::{ResourceKey, UpdateTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque token for one open watch.
///
/// Issued by the transport and handed back verbatim to close the watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchHandle(u64);

impl WatchHandle {
    /// Wraps a transport-issued id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type NotifyFn = dyn Fn(&[u8]) + Send + Sync;

/// Callback invoked by the transport for every change of a watched account.
#[derive(Clone)]
pub struct NotificationHandler {
    target: UpdateTarget,
    callback: Arc<NotifyFn>,
}

impl NotificationHandler {
    /// Creates a handler writing into `target`.
    pub fn new<F>(target: UpdateTarget, callback: F) -> Self
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        Self {
            target,
            callback: Arc::new(callback),
        }
    }

    /// Returns the state slice this handler updates.
    #[must_use]
    pub fn target(&self) -> UpdateTarget {
        self.target
    }

    /// Delivers one raw payload.
    pub fn notify(&self, payload: &[u8]) {
        (self.callback)(payload);
    }
}

impl fmt::Debug for NotificationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationHandler")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Opens and closes watches on remote accounts.
///
/// Implementations must tolerate being called from spawned tasks and must
/// invoke each handler for one key in the order changes were observed.
#[async_trait]
pub trait AccountWatchService: Send + Sync {
    /// Opens a watch on `key`; `handler` is called on every change until the
    /// returned handle is closed.
    async fn watch(
        &self,
        key: ResourceKey,
        handler: NotificationHandler,
    ) -> Result<WatchHandle, TransportError>;

    /// Closes a watch.
    async fn unwatch(&self, handle: WatchHandle) -> Result<(), TransportError>;
}

//! # Poolwatch Sync
//!
//! Live account subscription manager.
//!
//! Decides which remote pool accounts must be watched for the current
//! navigation/selection context, keeps exactly one open watch per account,
//! and routes change notifications into application state.
//!
//! Components, leaves first:
//! - [`transport`]: the [`AccountWatchService`] seam and an in-memory
//!   implementation
//! - [`registry`]: [`SubscriptionRegistry`], idempotent `ensure`/`release`
//!   with one active watch per key
//! - [`desired`]: [`DesiredSetComputer`], a pure mapping from
//!   [`SelectionContext`](poolwatch_core::types::SelectionContext) to the
//!   desired set
//! - [`controller`]: [`SubscriptionController`], diff-and-apply
//!   reconciliation
//! - [`dispatch`] and [`store`]: decoding notifications into a
//!   [`PoolStateStore`]
//! - [`report`]: the process-wide transport error channel

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod desired;
pub mod dispatch;
pub mod registry;
pub mod report;
pub mod store;
pub mod transport;

pub use controller::{ControllerHandle, ReconcileReport, SubscriptionController};
pub use desired::{DesiredSet, DesiredSetComputer, DesiredWatch};
pub use dispatch::{DispatchStats, NotificationDispatcher};
pub use registry::{ActiveSubscription, SubscriptionRegistry, SubscriptionState};
pub use report::{ChannelReporter, ErrorReporter, LogReporter};
pub use store::{InMemoryPoolStore, PoolStateStore};
pub use transport::{
    AccountWatchService, InMemoryWatchService, NotificationHandler, TransportCall, WatchHandle,
};

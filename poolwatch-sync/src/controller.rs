//! Reconciliation of the desired set against the registry.
//!
//! The [`SubscriptionController`] keeps the desired set of the previous pass
//! and, on every context change, releases what is no longer wanted before
//! ensuring what is newly wanted. Keys wanted by both passes are not touched,
//! unless their watch failed to open, in which case they are ensured again,
//! or their update target changed, in which case the old handler is released
//! before the new one is ensured.

use poolwatch_core::types::{ResourceKey, SelectionContext};
use poolwatch_telemetry::spans::reconcile_span;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::desired::{DesiredSet, DesiredSetComputer, DesiredWatch};
use crate::dispatch::NotificationDispatcher;
use crate::registry::SubscriptionRegistry;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Pass number, starting at 1.
    pub version: u64,
    /// Keys released, in release order.
    pub released: Vec<ResourceKey>,
    /// Keys ensured, in ensure order.
    pub ensured: Vec<ResourceKey>,
    /// Size of the new desired set.
    pub desired: usize,
}

impl ReconcileReport {
    /// Returns true if the pass changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.released.is_empty() && self.ensured.is_empty()
    }
}

/// Diff-and-apply driver between selection changes and the registry.
#[derive(Debug)]
pub struct SubscriptionController {
    computer: DesiredSetComputer,
    registry: Arc<SubscriptionRegistry>,
    dispatcher: Arc<NotificationDispatcher>,
    previous: DesiredSet,
    version: u64,
}

impl SubscriptionController {
    /// Creates a controller with an empty previous desired set.
    #[must_use]
    pub fn new(
        computer: DesiredSetComputer,
        registry: Arc<SubscriptionRegistry>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            computer,
            registry,
            dispatcher,
            previous: DesiredSet::new(),
            version: 0,
        }
    }

    /// Runs one reconciliation pass for `ctx`.
    ///
    /// Never awaits the transport: registry bookkeeping is updated
    /// immediately and transport failures go to the error reporter.
    pub fn reconcile(&mut self, ctx: &SelectionContext) -> ReconcileReport {
        self.version += 1;
        let span = reconcile_span(self.version);
        let _guard = span.enter();

        let next = self.computer.compute(ctx);

        let released: Vec<ResourceKey> = self
            .previous
            .iter()
            .filter(|w| !next.get(&w.key).is_some_and(|n| same_target(w, n)))
            .map(|w| w.key.clone())
            .collect();
        for key in &released {
            self.registry.release(key);
        }

        // Kept keys are retried only if their watch failed to open.
        let mut ensured = Vec::new();
        for wanted in &next {
            let kept = self
                .previous
                .get(&wanted.key)
                .is_some_and(|w| same_target(w, wanted));
            if kept && self.registry.has(&wanted.key) {
                continue;
            }
            let handler = self
                .dispatcher
                .handler(wanted.key.clone(), wanted.category.target());
            self.registry.ensure(wanted.key.clone(), handler);
            ensured.push(wanted.key.clone());
        }

        let report = ReconcileReport {
            version: self.version,
            released,
            ensured,
            desired: next.len(),
        };
        self.previous = next;

        if report.is_noop() {
            debug!(desired = report.desired, "Desired set unchanged");
        } else {
            info!(
                released = report.released.len(),
                ensured = report.ensured.len(),
                desired = report.desired,
                "Reconciled subscriptions"
            );
        }
        report
    }

    /// Releases every watch and forgets the previous desired set.
    pub fn teardown(&mut self) {
        let released = self.registry.release_all();
        self.previous = DesiredSet::new();
        info!(released, "Subscriptions torn down");
    }

    /// Full context reset (e.g. network switch): teardown, then a fresh pass.
    pub fn reset(&mut self, ctx: &SelectionContext) -> ReconcileReport {
        self.teardown();
        self.reconcile(ctx)
    }

    /// Desired set of the last pass.
    #[must_use]
    pub fn desired(&self) -> &DesiredSet {
        &self.previous
    }

    /// Number of passes run so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registry the controller drives.
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Moves the controller onto a task reacting to `contexts`.
    ///
    /// Runs a mount pass with the current context, then one pass per
    /// observed change. Changes published faster than passes complete are
    /// coalesced: only the latest context is reconciled, so an intermediate
    /// selection that was superseded before its pass started is never
    /// subscribed. Each pass diffs against the one before it. The loop tears
    /// everything down when the context sender is dropped or on
    /// [`ControllerHandle::shutdown`].
    #[must_use]
    pub fn spawn(mut self, mut contexts: watch::Receiver<SelectionContext>) -> ControllerHandle {
        let (commands, mut command_rx) = mpsc::channel(16);
        let (report_tx, reports) = watch::channel(ReconcileReport::default());

        let task = tokio::spawn(async move {
            let ctx = contexts.borrow_and_update().clone();
            report_tx.send_replace(self.reconcile(&ctx));

            loop {
                tokio::select! {
                    changed = contexts.changed() => {
                        if changed.is_err() {
                            debug!("Selection context closed");
                            break;
                        }
                        let ctx = contexts.borrow_and_update().clone();
                        report_tx.send_replace(self.reconcile(&ctx));
                    }
                    command = command_rx.recv() => match command {
                        Some(ControllerCommand::Reset) => {
                            let ctx = contexts.borrow_and_update().clone();
                            report_tx.send_replace(self.reset(&ctx));
                        }
                        Some(ControllerCommand::Shutdown) | None => break,
                    },
                }
            }

            self.teardown();
            self.registry.settle().await;
        });

        ControllerHandle {
            commands,
            reports,
            task,
        }
    }
}

fn same_target(a: &DesiredWatch, b: &DesiredWatch) -> bool {
    a.category.target() == b.category.target()
}

#[derive(Debug, Clone, Copy)]
enum ControllerCommand {
    Reset,
    Shutdown,
}

/// Handle to a spawned controller loop.
#[derive(Debug)]
pub struct ControllerHandle {
    commands: mpsc::Sender<ControllerCommand>,
    reports: watch::Receiver<ReconcileReport>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Requests a full reset (network switch). Returns false if the loop has
    /// already stopped.
    pub async fn reset(&self) -> bool {
        self.commands.send(ControllerCommand::Reset).await.is_ok()
    }

    /// Report of the latest completed pass.
    #[must_use]
    pub fn last_report(&self) -> ReconcileReport {
        self.reports.borrow().clone()
    }

    /// Waits until pass `version` (or a later one) has completed.
    ///
    /// Returns `None` if the loop stopped first.
    pub async fn wait_for_pass(&mut self, version: u64) -> Option<ReconcileReport> {
        self.reports
            .wait_for(|report| report.version >= version)
            .await
            .ok()
            .map(|report| report.clone())
    }

    /// Stops the loop, releases every watch and waits for the transport to
    /// settle.
    pub async fn shutdown(self) {
        // The loop may already have exited on its own.
        let _ = self.commands.send(ControllerCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Controller task failed");
        }
    }
}

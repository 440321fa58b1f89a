//! Navigation script replay.
//!
//! Drives a [`SubscriptionController`] over the in-memory transport, one
//! reconciliation pass per script step, and reports every pass and the
//! resulting transport calls.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use poolwatch_core::config::{ConfigLoader, WatchConfig};
use poolwatch_core::error::WatchError;
use poolwatch_core::types::{ResourceKey, RoutePath, SelectionContext, TradingPair};
use poolwatch_sync::{
    ActiveSubscription, ChannelReporter, DesiredSetComputer, DispatchStats, InMemoryPoolStore,
    InMemoryWatchService, NotificationDispatcher, ReconcileReport, SubscriptionController,
    SubscriptionRegistry, TransportCall,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AppConfig;

/// Arguments for the replay command
#[derive(Parser)]
pub struct ReplayArgs {
    /// Script file (.yaml, .toml or .json)
    #[arg(short, long)]
    pub script: PathBuf,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// A navigation script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Route at mount time.
    #[serde(default = "default_route")]
    pub route: String,
    /// Steps applied in order.
    pub steps: Vec<Step>,
}

fn default_route() -> String {
    "/".to_string()
}

/// Pool notification delivered by a `notify` step.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    /// Pool the notification is for.
    pub pool: ResourceKey,
    /// Account document, re-encoded as JSON before delivery.
    pub payload: serde_json::Value,
}

/// One script step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Change the route.
    Navigate(String),
    /// Select a trading pair.
    SelectPair(TradingPair),
    /// Clear the trading pair.
    ClearPair,
    /// Select the new-position pool.
    SelectPositionPool(ResourceKey),
    /// Clear the new-position pool.
    ClearPositionPool,
    /// Deliver a notification through the transport.
    Notify(Notification),
    /// Full reset, as on a network switch.
    NetworkSwitch,
    /// Make the transport refuse watches for a key.
    FailWatch(ResourceKey),
    /// Remove injected transport failures.
    ClearFailures,
}

/// Outcome of one applied step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// Step index, 0 for the mount pass.
    pub step: usize,
    /// Step name.
    pub action: &'static str,
    /// Reconciliation pass, if the step triggered one.
    pub report: Option<ReconcileReport>,
    /// Handlers reached by a `notify` step.
    pub delivered: Option<usize>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    /// Per-step outcomes.
    pub steps: Vec<StepOutcome>,
    /// Every transport call, in issue order.
    pub calls: Vec<TransportCall>,
    /// Registrations left before the final teardown.
    pub active: Vec<ActiveSubscription>,
    /// Dispatcher counters.
    pub dispatch: DispatchStats,
    /// Transport errors reported.
    pub errors: Vec<WatchError>,
    /// Watches still open after teardown.
    pub leaked: usize,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::SelectPair(_) => "select_pair",
            Self::ClearPair => "clear_pair",
            Self::SelectPositionPool(_) => "select_position_pool",
            Self::ClearPositionPool => "clear_position_pool",
            Self::Notify(_) => "notify",
            Self::NetworkSwitch => "network_switch",
            Self::FailWatch(_) => "fail_watch",
            Self::ClearFailures => "clear_failures",
        }
    }
}

/// Runs the replay command.
pub async fn run(config: &AppConfig, args: &ReplayArgs) -> Result<()> {
    let script: Script = ConfigLoader::new()
        .load_file(&args.script)
        .with_context(|| format!("Failed to load script {}", args.script.display()))?;

    let summary = replay(&config.watch, &script).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Replays `script` against a fresh in-memory transport.
pub async fn replay(config: &WatchConfig, script: &Script) -> Result<ReplaySummary> {
    let service = Arc::new(InMemoryWatchService::new());
    let reporter = ChannelReporter::new(256);
    let mut errors_rx = reporter.subscribe();
    let registry = Arc::new(SubscriptionRegistry::new(
        service.clone(),
        Arc::new(reporter),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(InMemoryPoolStore::new())));
    let computer = DesiredSetComputer::new(config.routes.clone(), Arc::new(config.catalog()));
    let mut controller = SubscriptionController::new(computer, registry.clone(), dispatcher.clone());

    let mut ctx = SelectionContext::on_route(script.route.clone());
    let mut steps = vec![StepOutcome {
        step: 0,
        action: "mount",
        report: Some(controller.reconcile(&ctx)),
        delivered: None,
    }];
    registry.settle().await;

    for (index, step) in script.steps.iter().enumerate() {
        debug!(step = index + 1, action = step.name(), "Applying step");
        let mut outcome = StepOutcome {
            step: index + 1,
            action: step.name(),
            report: None,
            delivered: None,
        };

        match step {
            Step::Navigate(route) => {
                ctx.route = RoutePath::new(route.clone());
                outcome.report = Some(controller.reconcile(&ctx));
            }
            Step::SelectPair(pair) => {
                ctx.trading_pair = Some(pair.clone());
                outcome.report = Some(controller.reconcile(&ctx));
            }
            Step::ClearPair => {
                ctx.trading_pair = None;
                outcome.report = Some(controller.reconcile(&ctx));
            }
            Step::SelectPositionPool(pool) => {
                ctx.new_position_pool = Some(pool.clone());
                outcome.report = Some(controller.reconcile(&ctx));
            }
            Step::ClearPositionPool => {
                ctx.new_position_pool = None;
                outcome.report = Some(controller.reconcile(&ctx));
            }
            Step::Notify(notification) => {
                let bytes = serde_json::to_vec(&notification.payload)
                    .context("Failed to encode notification payload")?;
                outcome.delivered = Some(service.emit(&notification.pool, &bytes));
            }
            Step::NetworkSwitch => outcome.report = Some(controller.reset(&ctx)),
            Step::FailWatch(key) => service.fail_watch_for(key.clone()),
            Step::ClearFailures => service.clear_failures(),
        }

        registry.settle().await;
        steps.push(outcome);
    }

    let active = registry.snapshot();
    controller.teardown();
    registry.settle().await;

    let mut errors = Vec::new();
    while let Ok(error) = errors_rx.try_recv() {
        errors.push(error);
    }

    let summary = ReplaySummary {
        steps,
        calls: service.calls(),
        active,
        dispatch: dispatcher.stats(),
        errors,
        leaked: service.open_count(),
    };
    info!(
        steps = summary.steps.len(),
        calls = summary.calls.len(),
        leaked = summary.leaked,
        "Replay finished"
    );
    Ok(summary)
}

fn print_summary(summary: &ReplaySummary) {
    println!("Replay");
    println!("======");
    for outcome in &summary.steps {
        match (&outcome.report, outcome.delivered) {
            (Some(report), _) => println!(
                "[{:>2}] {:<22} pass {:<3} -{} +{} (desired {})",
                outcome.step,
                outcome.action,
                report.version,
                report.released.len(),
                report.ensured.len(),
                report.desired
            ),
            (None, Some(delivered)) => println!(
                "[{:>2}] {:<22} delivered to {delivered} handler(s)",
                outcome.step, outcome.action
            ),
            (None, None) => println!("[{:>2}] {}", outcome.step, outcome.action),
        }
        if let Some(report) = &outcome.report {
            for key in &report.released {
                println!("       - {}", key.short());
            }
            for key in &report.ensured {
                println!("       + {}", key.short());
            }
        }
    }

    println!();
    println!("Transport calls: {}", summary.calls.len());
    for call in &summary.calls {
        match call {
            TransportCall::Watch { key } => println!("  watch   {key}"),
            TransportCall::Unwatch { handle, key } => match key {
                Some(key) => println!("  unwatch {key} ({handle})"),
                None => println!("  unwatch {handle}"),
            },
        }
    }

    println!();
    println!("Active before teardown: {}", summary.active.len());
    println!(
        "Notifications: {} applied, {} dropped",
        summary.dispatch.applied, summary.dispatch.dropped
    );
    println!("Transport errors: {}", summary.errors.len());
    for error in &summary.errors {
        println!("  {error}");
    }
    println!("Leaked watches: {}", summary.leaked);
}

//! Span definitions for subscription tracing.
//!
//! Provides pre-defined spans for:
//! - Reconciliation passes
//! - Notification dispatch
//! - Transport open/close calls

use tracing::{Span, debug_span, info_span};

/// Create a span for one reconciliation pass.
///
/// # Example
///
/// ```
/// use poolwatch_telemetry::spans::reconcile_span;
///
/// let span = reconcile_span(3);
/// let _guard = span.enter();
/// // ... diff and apply
/// ```
#[must_use]
pub fn reconcile_span(version: u64) -> Span {
    info_span!("reconcile", version = version)
}

/// Create a span for dispatching one notification.
///
/// Debug level: notifications are high frequency.
#[must_use]
pub fn dispatch_span(key: &str, target: &str) -> Span {
    debug_span!("dispatch", key = %key, target = %target)
}

/// Create a span for a transport call (`watch` or `unwatch`).
#[must_use]
pub fn transport_span(operation: &str, key: &str) -> Span {
    info_span!(
        "transport",
        operation = %operation,
        key = %key,
        otel.kind = "client"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    fn init_test_subscriber() {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    }

    #[test]
    fn test_reconcile_span() {
        init_test_subscriber();
        let span = reconcile_span(1);
        let _guard = span.enter();
    }

    #[test]
    fn test_dispatch_span() {
        init_test_subscriber();
        let span = dispatch_span("9vqY…XoAe", "swap_pools");
        let _guard = span.enter();
    }

    #[test]
    fn test_transport_span() {
        init_test_subscriber();
        let span = transport_span("watch", "9vqY…XoAe");
        let _guard = span.enter();
    }
}

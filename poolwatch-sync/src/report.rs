//! Transport error reporting.
//!
//! Nothing in this crate returns transport failures to its callers. They
//! are turned into [`WatchError`] events and handed to an [`ErrorReporter`],
//! which decides what the user sees (e.g. an "RPC unhealthy" banner).

use poolwatch_core::error::{ErrorSeverity, WatchError};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Sink for failures surfaced by `ensure`, `release`, `watch` and `unwatch`.
pub trait ErrorReporter: Send + Sync {
    /// Reports one failure. Must not block or panic.
    fn report_transport_error(&self, error: &WatchError);
}

/// Reporter that only logs, at a level derived from the error severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report_transport_error(&self, err: &WatchError) {
        let key = err.key();
        match err.severity() {
            ErrorSeverity::Fatal => error!(key = %key, error = %err, "Transport error"),
            ErrorSeverity::Recoverable | ErrorSeverity::Warning => {
                warn!(key = %key, error = %err, "Transport error");
            }
            ErrorSeverity::Info => info!(key = %key, error = %err, "Transport error"),
        }
    }
}

/// Reporter publishing every error on a broadcast channel, after logging it.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: broadcast::Sender<WatchError>,
}

impl ChannelReporter {
    /// Creates a reporter buffering up to `capacity` errors per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a receiver for subsequent errors.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WatchError> {
        self.sender.subscribe()
    }
}

impl Default for ChannelReporter {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ErrorReporter for ChannelReporter {
    fn report_transport_error(&self, err: &WatchError) {
        LogReporter.report_transport_error(err);
        if self.sender.send(err.clone()).is_err() {
            debug!("No error subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolwatch_core::error::TransportError;
    use poolwatch_core::types::ResourceKey;

    fn open_error() -> WatchError {
        WatchError::open(
            ResourceKey::new_unchecked("PoolAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            TransportError::Timeout { timeout_ms: 500 },
        )
    }

    #[test]
    fn test_log_reporter_does_not_panic() {
        LogReporter.report_transport_error(&open_error());
    }

    #[test]
    fn test_channel_reporter_publishes() {
        let reporter = ChannelReporter::new(4);
        let mut rx = reporter.subscribe();

        reporter.report_transport_error(&open_error());

        assert_eq!(rx.try_recv().unwrap(), open_error());
    }

    #[test]
    fn test_channel_reporter_without_subscribers() {
        ChannelReporter::default().report_transport_error(&open_error());
    }
}

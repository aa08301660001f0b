//! `FailureNotifier` that emits structured error events.
//!
//! Events go to a dedicated target so log routing can page on them
//! without matching message text, e.g. `RUST_LOG=payment_intake::alerts=error`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::ports::{FailureNotifier, RecordFailure};

/// Tracing target for unrecorded-payment alerts.
pub const ALERT_TARGET: &str = "payment_intake::alerts";

/// Logs each failure at `ERROR` on [`ALERT_TARGET`].
#[derive(Debug, Default)]
pub struct TracingFailureNotifier {
    notified: AtomicU64,
}

impl TracingFailureNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported since startup.
    pub fn notified_count(&self) -> u64 {
        self.notified.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FailureNotifier for TracingFailureNotifier {
    async fn notify_record_failed(&self, failure: &RecordFailure) {
        let total = self.notified.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::error!(
            target: ALERT_TARGET,
            kind = %failure.kind,
            event_id = %failure.event_id,
            source_session_id = failure.source_session_id.as_deref().unwrap_or("-"),
            reason = %failure.reason,
            occurred_at = %failure.occurred_at.as_datetime().to_rfc3339(),
            total_failures = total,
            "Payment not recorded"
        );
    }
}

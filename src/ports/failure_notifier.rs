//! FailureNotifier port - hook for payments that could not be recorded.
//!
//! Recording failures are never surfaced to Stripe (the webhook is still
//! acknowledged), so something else has to notice them. Implementations may
//! log, page, or enqueue for reconciliation.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Why a verified checkout event did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFailureKind {
    /// The event lacked required fields or carried unusable values.
    InvalidEvent,
    /// The store write failed or timed out.
    StoreWrite,
}

impl fmt::Display for RecordFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFailureKind::InvalidEvent => write!(f, "invalid_event"),
            RecordFailureKind::StoreWrite => write!(f, "store_write"),
        }
    }
}

/// Details of a payment that was not recorded.
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub kind: RecordFailureKind,
    /// Stripe event id (evt_xxx).
    pub event_id: String,
    /// Session id when it could be extracted.
    pub source_session_id: Option<String>,
    pub reason: String,
    pub occurred_at: Timestamp,
}

impl RecordFailure {
    pub fn new(
        kind: RecordFailureKind,
        event_id: impl Into<String>,
        source_session_id: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            event_id: event_id.into(),
            source_session_id,
            reason: reason.into(),
            occurred_at: Timestamp::now(),
        }
    }
}

/// Port for reporting unrecorded payments.
#[async_trait]
pub trait FailureNotifier: Send + Sync {
    /// Report a failure. Must not fail; implementations swallow their own errors.
    async fn notify_record_failed(&self, failure: &RecordFailure);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn FailureNotifier) {}
    }

    #[test]
    fn kind_displays_snake_case() {
        assert_eq!(RecordFailureKind::StoreWrite.to_string(), "store_write");
        assert_eq!(RecordFailureKind::InvalidEvent.to_string(), "invalid_event");
    }

    #[test]
    fn new_failure_keeps_session_id() {
        let failure = RecordFailure::new(
            RecordFailureKind::StoreWrite,
            "evt_1",
            Some("cs_1".to_string()),
            "timed out",
        );
        assert_eq!(failure.source_session_id.as_deref(), Some("cs_1"));
        assert_eq!(failure.event_id, "evt_1");
    }
}

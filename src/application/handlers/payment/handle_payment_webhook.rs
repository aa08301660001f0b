//! HandlePaymentWebhookHandler - Command handler for Stripe webhook deliveries.
//!
//! Verification failures are the only errors returned. Once a delivery is
//! verified it is always acknowledged; payments that cannot be recorded are
//! reported through the [`FailureNotifier`] instead.

use std::sync::Arc;

use crate::domain::payment::{
    CheckoutSessionCompleted, EventRoute, EventRouter, StripeWebhookVerifier, VerifiedEvent,
    WebhookError,
};
use crate::ports::{FailureNotifier, RecordFailure, RecordFailureKind};

use super::record_payment::{RecordOutcome, RecordPaymentCommand, RecordPaymentHandler};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, byte-for-byte as received.
    pub payload: Vec<u8>,
    /// Stripe-Signature header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing after successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// A new payment record was written.
    Recorded { source_session_id: String },
    /// Duplicate delivery; record already present.
    AlreadyRecorded { source_session_id: String },
    /// Event type not handled.
    Ignored { event_type: String },
    /// Recording failed; reported through the failure hook.
    RecordFailed { kind: RecordFailureKind },
}

/// Handler for processing payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    recorder: Arc<RecordPaymentHandler>,
    notifier: Arc<dyn FailureNotifier>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        recorder: Arc<RecordPaymentHandler>,
        notifier: Arc<dyn FailureNotifier>,
    ) -> Self {
        Self {
            verifier,
            recorder,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let event = self
            .verifier
            .verify(&cmd.payload, cmd.signature.as_deref())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected webhook delivery");
                e
            })?;

        tracing::debug!(
            event_id = %event.event().id,
            event_type = %event.event().event_type,
            livemode = event.event().livemode,
            "Webhook verified"
        );

        match EventRouter::route(event) {
            EventRoute::CheckoutSessionCompleted(event) => {
                Ok(self.handle_checkout_completed(event).await)
            }
            EventRoute::Ignored { event_type } => {
                tracing::debug!(event_type = %event_type, "Ignoring unhandled event type");
                Ok(HandlePaymentWebhookResult::Ignored { event_type })
            }
        }
    }

    async fn handle_checkout_completed(&self, event: VerifiedEvent) -> HandlePaymentWebhookResult {
        let event = event.into_inner();

        let session = match CheckoutSessionCompleted::from_event(&event) {
            Ok(session) => session,
            Err(e) => {
                let session_id = event
                    .data
                    .object
                    .get("id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                return self
                    .report(RecordFailure::new(
                        RecordFailureKind::InvalidEvent,
                        &event.id,
                        session_id,
                        e.to_string(),
                    ))
                    .await;
            }
        };

        let session_id = session.session_id.clone();
        match self.recorder.handle(RecordPaymentCommand { session }).await {
            Ok(RecordOutcome::Recorded(record)) => HandlePaymentWebhookResult::Recorded {
                source_session_id: record.source_session_id,
            },
            Ok(RecordOutcome::AlreadyRecorded { source_session_id }) => {
                HandlePaymentWebhookResult::AlreadyRecorded { source_session_id }
            }
            Err(e) => {
                self.report(RecordFailure::new(
                    RecordFailureKind::StoreWrite,
                    &event.id,
                    Some(session_id),
                    e.to_string(),
                ))
                .await
            }
        }
    }

    async fn report(&self, failure: RecordFailure) -> HandlePaymentWebhookResult {
        tracing::error!(
            event_id = %failure.event_id,
            source_session_id = failure.source_session_id.as_deref().unwrap_or("-"),
            kind = %failure.kind,
            reason = %failure.reason,
            "Failed to record payment"
        );
        self.notifier.notify_record_failed(&failure).await;
        HandlePaymentWebhookResult::RecordFailed { kind: failure.kind }
    }
}

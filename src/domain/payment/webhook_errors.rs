//! Webhook error types.
//!
//! Every verification failure is a client error: the event source gets a
//! 400 and nothing is routed or written.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while verifying or decoding a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// The Stripe-Signature header was absent or not valid UTF-8.
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    /// No v1 signature matched the expected HMAC.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signature timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header or the event envelope.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A test-mode event arrived while live mode is required.
    #[error("Test mode events are not accepted")]
    TestModeRejected,

    /// Required field missing from a verified event's payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl WebhookError {
    /// Maps the error to an HTTP status code.
    ///
    /// 4xx responses tell Stripe not to retry the delivery.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// True for failures of the signature check itself.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }
}

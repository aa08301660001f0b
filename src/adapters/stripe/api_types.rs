//! Stripe REST API wire types.
//!
//! Only fields we read are declared; everything else in Stripe's responses
//! is ignored.

use serde::Deserialize;

/// Checkout Session object as returned by `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session ID (cs_xxx format).
    pub id: String,

    /// Hosted payment page URL. Null once the session is complete or expired.
    #[serde(default)]
    pub url: Option<String>,

    /// Session expiration (Unix timestamp).
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Error envelope Stripe returns with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

/// Error detail within [`StripeErrorResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    /// Human-readable message, safe to show to the caller.
    #[serde(default)]
    pub message: Option<String>,

    /// Error category (e.g., `invalid_request_error`, `card_error`).
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    /// Short machine code (e.g., `parameter_invalid_integer`).
    #[serde(default)]
    pub code: Option<String>,

    /// Request parameter the error relates to.
    #[serde(default)]
    pub param: Option<String>,
}

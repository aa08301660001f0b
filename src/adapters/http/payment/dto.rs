//! Request and response bodies for the payment endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /create-checkout-session`.
///
/// `amount` stays untyped so that `25.5` or `"2550"` reach validation
/// and get a precise message instead of a generic JSON rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response of `POST /create-checkout-session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// Acknowledgement returned for every verified webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

impl WebhookAckResponse {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Error body for all endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code for programmatic handling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_keeps_amount_as_raw_json() {
        let req: CreateCheckoutSessionRequest =
            serde_json::from_value(json!({"amount": 25.5, "currency": "usd"})).unwrap();

        assert_eq!(req.amount, json!(25.5));
        assert_eq!(req.currency.as_deref(), Some("usd"));
    }

    #[test]
    fn request_fields_default_when_absent() {
        let req: CreateCheckoutSessionRequest = serde_json::from_value(json!({})).unwrap();

        assert!(req.amount.is_null());
        assert!(req.currency.is_none());
    }

    #[test]
    fn ack_serializes_as_received_true() {
        assert_eq!(
            serde_json::to_value(WebhookAckResponse::received()).unwrap(),
            json!({"received": true})
        );
    }

    #[test]
    fn error_response_puts_message_under_error() {
        let body = serde_json::to_value(ErrorResponse::new("INVALID_SIGNATURE", "Invalid signature"))
            .unwrap();

        assert_eq!(
            body,
            json!({"error": "Invalid signature", "code": "INVALID_SIGNATURE"})
        );
    }
}

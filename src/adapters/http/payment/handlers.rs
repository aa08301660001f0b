//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the application layer command handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::{
    CheckoutError, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
};
use crate::domain::payment::WebhookError;
use crate::ports::ProcessorErrorCode;

use super::dto::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, ErrorResponse, WebhookAckResponse,
};

/// Header carrying Stripe's `t=...,v1=...` signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for payment routes.
///
/// Handlers are built once at startup; cloning the state only clones the Arcs.
#[derive(Clone)]
pub struct PaymentAppState {
    pub webhook_handler: Arc<HandlePaymentWebhookHandler>,
    pub checkout_handler: Arc<CreateCheckoutSessionHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhook - Verify and process a Stripe event delivery.
///
/// The body is taken as raw bytes: the signature covers the exact payload,
/// so it must not pass through a JSON parser first.
pub async fn handle_stripe_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PaymentApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let result = state.webhook_handler.handle(cmd).await?;
    tracing::debug!(result = ?result, "Webhook acknowledged");

    Ok(Json(WebhookAckResponse::received()))
}

/// POST /create-checkout-session - Start a hosted checkout.
pub async fn create_checkout_session(
    State(state): State<PaymentAppState>,
    payload: Result<Json<CreateCheckoutSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let Json(request) = payload.map_err(|e| PaymentApiError::MalformedBody(e.body_text()))?;

    let cmd = CreateCheckoutSessionCommand {
        amount: request.amount,
        currency: request.currency.unwrap_or_default(),
    };

    let result = state.checkout_handler.handle(cmd).await?;

    Ok(Json(CheckoutSessionResponse { url: result.url }))
}

/// GET /health - Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts handler errors to HTTP responses.
#[derive(Debug)]
pub enum PaymentApiError {
    Webhook(WebhookError),
    Checkout(CheckoutError),
    MalformedBody(String),
}

impl From<WebhookError> for PaymentApiError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl From<CheckoutError> for PaymentApiError {
    fn from(err: CheckoutError) -> Self {
        Self::Checkout(err)
    }
}

fn webhook_error_code(err: &WebhookError) -> &'static str {
    match err {
        WebhookError::MissingSignature => "MISSING_SIGNATURE",
        WebhookError::InvalidSignature => "INVALID_SIGNATURE",
        WebhookError::TimestampOutOfRange | WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
        WebhookError::ParseError(_) | WebhookError::MissingField(_) => "INVALID_PAYLOAD",
        WebhookError::TestModeRejected => "TEST_MODE_REJECTED",
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            PaymentApiError::Webhook(err) => (
                err.status_code(),
                ErrorResponse::new(webhook_error_code(err), err.to_string()),
            ),
            PaymentApiError::Checkout(CheckoutError::Validation(err)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_FAILED", err.to_string()),
            ),
            PaymentApiError::Checkout(CheckoutError::Processor(err)) => {
                tracing::error!(
                    code = %err.code,
                    provider_code = err.provider_code.as_deref().unwrap_or("-"),
                    error = %err.message,
                    "Checkout session creation failed"
                );
                let code = match err.code {
                    ProcessorErrorCode::Timeout => "PROCESSOR_TIMEOUT",
                    _ => "PROCESSOR_ERROR",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(code, err.message.clone()),
                )
            }
            PaymentApiError::MalformedBody(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("MALFORMED_BODY", message.clone()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

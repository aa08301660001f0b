//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_checkout_session, handle_stripe_webhook, health, PaymentAppState};

/// Create the payment API router.
///
/// # Routes
/// - `POST /webhook` - Stripe webhook deliveries (signature verified, raw body)
/// - `POST /create-checkout-session` - Start a hosted checkout (JSON body)
/// - `GET /health` - Liveness check
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/webhook", post(handle_stripe_webhook))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/health", get(health))
}

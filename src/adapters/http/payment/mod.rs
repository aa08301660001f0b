//! HTTP adapter for payment endpoints.
//!
//! - `POST /webhook` - Handle Stripe webhooks
//! - `POST /create-checkout-session` - Create a hosted checkout session
//! - `GET /health` - Liveness check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{PaymentApiError, PaymentAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::payment_routes;

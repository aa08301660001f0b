//! Payment handlers.
//!
//! ## Commands
//! - Recording a payment for a completed checkout session
//! - Processing Stripe webhook deliveries
//! - Creating hosted checkout sessions

mod create_checkout_session;
mod handle_payment_webhook;
mod record_payment;

pub use create_checkout_session::{
    CheckoutError, CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use record_payment::{RecordError, RecordOutcome, RecordPaymentCommand, RecordPaymentHandler};

//! Payment domain module.
//!
//! Webhook verification, event routing, and the payment record model.
//!
//! # Module Structure
//!
//! - `money` - Currency codes and minor-unit conversion
//! - `record` - PaymentRecord written once per checkout session
//! - `checkout` - Completed checkout session extracted from an event
//! - `stripe_event` - Stripe webhook event envelope
//! - `webhook_verifier` - HMAC-SHA256 signature verification
//! - `webhook_errors` - Webhook error taxonomy
//! - `event_router` - Type-tag dispatch of verified events

mod checkout;
mod event_router;
mod money;
mod record;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use checkout::CheckoutSessionCompleted;
pub use event_router::{EventRoute, EventRouter};
pub use money::{Currency, MinorUnits};
pub use record::{PaymentRecord, PaymentStatus, StoredPayment};
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{
    SignatureHeader, StripeWebhookVerifier, VerifiedEvent, DEFAULT_TOLERANCE_SECS,
};

#[cfg(test)]
pub(crate) use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub(crate) use webhook_verifier::compute_test_signature;

//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe hosted checkout.
//! Webhook signature verification lives in the domain
//! (`domain::payment::StripeWebhookVerifier`) since it needs no I/O.
//!
//! # Security
//!
//! - The secret API key is held in `secrecy::SecretString` and only exposed
//!   when building the request's basic auth header

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeCheckoutSession, StripeErrorResponse};
pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};

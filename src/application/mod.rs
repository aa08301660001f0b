//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::payment::{
    CheckoutError, CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    HandlePaymentWebhookResult, RecordError, RecordOutcome, RecordPaymentCommand,
    RecordPaymentHandler,
};

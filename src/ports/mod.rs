//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentRepository` - Idempotent sink for payment records
//! - `PaymentProvider` - Hosted checkout session creation
//! - `FailureNotifier` - Hook for payments that could not be recorded

mod failure_notifier;
mod payment_provider;
mod payment_repository;

pub use failure_notifier::{FailureNotifier, RecordFailure, RecordFailureKind};
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, PaymentProvider, ProcessorError, ProcessorErrorCode,
};
pub use payment_repository::{PaymentRepository, SaveResult, StoreWriteError};

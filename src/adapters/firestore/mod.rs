//! Cloud Firestore adapter (REST API).
//!
//! - `credentials` - service-account key parsing
//! - `token` - OAuth2 bearer tokens (JWT-bearer grant, emulator token)
//! - `document` - typed field encoding for payment records
//! - `repository` - `PaymentRepository` implementation

mod credentials;
mod document;
mod repository;
mod token;

pub use credentials::{CredentialsError, ServiceAccountCredentials};
pub use repository::FirestorePaymentRepository;
pub use token::{ServiceAccountTokenSource, StaticTokenSource, TokenSource};

#[cfg(test)]
pub(crate) use credentials::fixtures as test_fixtures;

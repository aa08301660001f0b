//! In-memory adapters for tests and local development.

mod payment_repository;

pub use payment_repository::InMemoryPaymentRepository;

//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Checkout session creation (Stripe REST API, mock)
//! - `firestore` - Payment records in Cloud Firestore
//! - `postgres` - Payment records in PostgreSQL
//! - `memory` - In-process payment records for tests and local runs
//! - `alerting` - Failure notification via tracing
//! - `http` - Axum routes, handlers and layers

pub mod alerting;
pub mod firestore;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

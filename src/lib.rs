//! Payment Intake - hosted checkout and Stripe webhook recording
//!
//! Creates Stripe Checkout sessions for a fixed product and records each
//! completed payment exactly once, keyed by its checkout session id, in a
//! document store (Cloud Firestore, PostgreSQL or in-memory).

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;

//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, errors)
//! - `payment` - Webhook verification, event routing, payment records

pub mod foundation;
pub mod payment;

//! Foundation module - Shared domain primitives.
//!
//! Contains value objects and error types that form the vocabulary
//! of the payment intake domain.

mod errors;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use timestamp::Timestamp;

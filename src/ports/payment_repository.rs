//! PaymentRepository port - durable sink for payment records.
//!
//! Stripe may deliver the same webhook more than once:
//! - Network timeouts
//! - Our endpoint returning success but Stripe not receiving it
//! - Manual resends from the dashboard
//!
//! Idempotency is therefore enforced by the store itself: `create_if_absent`
//! is a single conditional write keyed on the source session id, never a
//! read followed by a write.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{PaymentRecord, StoredPayment};

/// Result of attempting to save a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this session).
    Inserted,
    /// A record for this session already exists.
    AlreadyExists,
}

/// Failures writing to or reading from the payment store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreWriteError {
    /// The store could not be reached (network, DNS, pool exhausted).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The write did not complete within the configured deadline.
    #[error("Store write timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected the request (auth, permissions, bad request).
    #[error("Store rejected write: {0}")]
    Rejected(String),

    /// The store returned data that could not be decoded.
    #[error("Store returned malformed data: {0}")]
    Malformed(String),
}

impl From<StoreWriteError> for DomainError {
    fn from(err: StoreWriteError) -> Self {
        let code = match err {
            StoreWriteError::Timeout(_) => ErrorCode::Timeout,
            _ => ErrorCode::DatabaseError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Port for persisting payment records.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Creates the record unless one with the same `source_session_id` exists.
    ///
    /// Must be a single atomic conditional write. Returns
    /// `SaveResult::AlreadyExists` (not an error) for duplicates.
    async fn create_if_absent(&self, record: &PaymentRecord)
        -> Result<SaveResult, StoreWriteError>;

    /// Reads back the record written for a checkout session.
    ///
    /// The webhook path never calls this; idempotency rests on
    /// `create_if_absent` alone. It exists so a write can be verified
    /// (tests, operational checks) through the same adapter that made it.
    async fn find_by_source_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredPayment>, StoreWriteError>;
}

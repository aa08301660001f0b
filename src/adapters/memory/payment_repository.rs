//! In-memory implementation of `PaymentRepository`.
//!
//! The existence check and the insert happen under one write lock, which
//! gives the same create-if-absent guarantee as a unique constraint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{PaymentRecord, StoredPayment};
use crate::ports::{PaymentRepository, SaveResult, StoreWriteError};

/// Payment records keyed by source session id.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    records: Arc<RwLock<HashMap<String, StoredPayment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create_if_absent(
        &self,
        record: &PaymentRecord,
    ) -> Result<SaveResult, StoreWriteError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.source_session_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        records.insert(
            record.source_session_id.clone(),
            StoredPayment {
                record: record.clone(),
                created_at: Timestamp::now(),
            },
        );
        Ok(SaveResult::Inserted)
    }

    async fn find_by_source_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredPayment>, StoreWriteError> {
        Ok(self.records.read().await.get(session_id).cloned())
    }
}

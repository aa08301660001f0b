//! RecordPaymentHandler - Command handler for writing a payment record once.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::payment::{CheckoutSessionCompleted, PaymentRecord};
use crate::ports::{PaymentRepository, SaveResult, StoreWriteError};

/// Command to record the payment for a completed checkout session.
#[derive(Debug, Clone)]
pub struct RecordPaymentCommand {
    pub session: CheckoutSessionCompleted,
}

/// Result of a successful record attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new record was written.
    Recorded(PaymentRecord),
    /// A record for this session already existed; nothing written.
    AlreadyRecorded { source_session_id: String },
}

/// Errors from recording a payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Store(#[from] StoreWriteError),
}

/// Handler for recording payments.
///
/// Relies on the repository's conditional create for idempotency; there is
/// no existence check before the write.
pub struct RecordPaymentHandler {
    repository: Arc<dyn PaymentRepository>,
    write_timeout: Duration,
}

impl RecordPaymentHandler {
    pub fn new(repository: Arc<dyn PaymentRepository>, write_timeout: Duration) -> Self {
        Self {
            repository,
            write_timeout,
        }
    }

    pub async fn handle(&self, cmd: RecordPaymentCommand) -> Result<RecordOutcome, RecordError> {
        let record = PaymentRecord::paid(&cmd.session);

        let result = tokio::time::timeout(
            self.write_timeout,
            self.repository.create_if_absent(&record),
        )
        .await
        .map_err(|_| StoreWriteError::Timeout(self.write_timeout))??;

        match result {
            SaveResult::Inserted => {
                tracing::info!(
                    source_session_id = %record.source_session_id,
                    amount = %record.amount,
                    currency = %record.currency,
                    "Payment recorded"
                );
                Ok(RecordOutcome::Recorded(record))
            }
            SaveResult::AlreadyExists => {
                tracing::info!(
                    source_session_id = %record.source_session_id,
                    "Payment already recorded, skipping duplicate delivery"
                );
                Ok(RecordOutcome::AlreadyRecorded {
                    source_session_id: record.source_session_id,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentRepository;
    use crate::domain::payment::{Currency, StoredPayment};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn command(session_id: &str, amount_total: i64, currency: &str) -> RecordPaymentCommand {
        RecordPaymentCommand {
            session: CheckoutSessionCompleted {
                session_id: session_id.to_string(),
                amount_total,
                currency: Currency::parse(currency).unwrap(),
            },
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct FailingRepository;

    #[async_trait]
    impl PaymentRepository for FailingRepository {
        async fn create_if_absent(
            &self,
            _record: &PaymentRecord,
        ) -> Result<SaveResult, StoreWriteError> {
            Err(StoreWriteError::Unavailable("connection refused".to_string()))
        }

        async fn find_by_source_session_id(
            &self,
            _session_id: &str,
        ) -> Result<Option<StoredPayment>, StoreWriteError> {
            Ok(None)
        }
    }

    struct HangingRepository;

    #[async_trait]
    impl PaymentRepository for HangingRepository {
        async fn create_if_absent(
            &self,
            _record: &PaymentRecord,
        ) -> Result<SaveResult, StoreWriteError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(SaveResult::Inserted)
        }

        async fn find_by_source_session_id(
            &self,
            _session_id: &str,
        ) -> Result<Option<StoredPayment>, StoreWriteError> {
            Ok(None)
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn records_new_payment() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let handler = RecordPaymentHandler::new(repo.clone(), Duration::from_secs(5));

        let outcome = handler.handle(command("cs_test_123", 2550, "usd")).await.unwrap();

        match outcome {
            RecordOutcome::Recorded(record) => {
                assert_eq!(record.amount, Decimal::from_str("25.50").unwrap());
                assert_eq!(record.source_session_id, "cs_test_123");
            }
            other => panic!("expected Recorded, got {:?}", other),
        }
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn second_delivery_is_a_no_op() {
        let repo = Arc::new(InMemoryPaymentRepository::new());
        let handler = RecordPaymentHandler::new(repo.clone(), Duration::from_secs(5));

        handler.handle(command("cs_dup", 1000, "usd")).await.unwrap();
        let second = handler.handle(command("cs_dup", 1000, "usd")).await.unwrap();

        assert_eq!(
            second,
            RecordOutcome::AlreadyRecorded {
                source_session_id: "cs_dup".to_string()
            }
        );
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn store_failure_is_returned() {
        let handler = RecordPaymentHandler::new(Arc::new(FailingRepository), Duration::from_secs(5));

        let result = handler.handle(command("cs_1", 1000, "usd")).await;

        assert!(matches!(
            result,
            Err(RecordError::Store(StoreWriteError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let handler =
            RecordPaymentHandler::new(Arc::new(HangingRepository), Duration::from_millis(50));

        let result = handler.handle(command("cs_1", 1000, "usd")).await;

        assert_eq!(
            result,
            Err(RecordError::Store(StoreWriteError::Timeout(Duration::from_millis(50))))
        );
    }
}

//! PostgreSQL implementation of PaymentRepository.
//!
//! Idempotency comes from the UNIQUE constraint on `source_session_id`
//! combined with `ON CONFLICT DO NOTHING`: concurrent deliveries race on the
//! index, and exactly one insert affects a row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{Currency, PaymentRecord, PaymentStatus, StoredPayment};
use crate::ports::{PaymentRepository, SaveResult, StoreWriteError};

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new PostgresPaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    source_session_id: String,
    amount: Decimal,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for StoredPayment {
    type Error = StoreWriteError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let currency = Currency::parse(&row.currency)
            .map_err(|e| StoreWriteError::Malformed(format!("Invalid currency: {}", e)))?;
        let status = PaymentStatus::parse(&row.status).ok_or_else(|| {
            StoreWriteError::Malformed(format!("Invalid status value: {}", row.status))
        })?;

        Ok(StoredPayment {
            record: PaymentRecord {
                amount: row.amount,
                currency,
                status,
                source_session_id: row.source_session_id,
            },
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Maps sqlx errors onto the store error taxonomy.
fn map_sqlx_error(e: sqlx::Error) -> StoreWriteError {
    match e {
        sqlx::Error::Database(db_err) => StoreWriteError::Rejected(db_err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::RowNotFound => {
            StoreWriteError::Malformed(e.to_string())
        }
        other => StoreWriteError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create_if_absent(
        &self,
        record: &PaymentRecord,
    ) -> Result<SaveResult, StoreWriteError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (id, source_session_id, amount, currency, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_session_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.source_session_id)
        .bind(record.amount)
        .bind(record.currency.code())
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn find_by_source_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredPayment>, StoreWriteError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT source_session_id, amount, currency, status, created_at
            FROM payments
            WHERE source_session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(StoredPayment::try_from).transpose()
    }
}

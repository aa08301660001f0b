//! The payment record written once per completed checkout session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::checkout::CheckoutSessionCompleted;
use super::money::Currency;
use crate::domain::foundation::Timestamp;

/// Status of a recorded payment. Only successful payments are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
        }
    }

    /// Parses the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized payment record.
///
/// `source_session_id` is the natural key: at most one record exists per
/// checkout session. `createdAt` is assigned by the store, so it lives on
/// [`StoredPayment`] rather than here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub source_session_id: String,
}

impl PaymentRecord {
    /// Builds the record for a completed checkout session.
    pub fn paid(session: &CheckoutSessionCompleted) -> Self {
        Self {
            amount: session.currency.to_major_units(session.amount_total),
            currency: session.currency.clone(),
            status: PaymentStatus::Paid,
            source_session_id: session.session_id.clone(),
        }
    }
}

/// A record as read back from the store, with its server-assigned timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPayment {
    #[serde(flatten)]
    pub record: PaymentRecord,
    pub created_at: Timestamp,
}

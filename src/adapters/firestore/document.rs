//! Mapping between payment records and Firestore typed field values.
//!
//! Firestore's REST API wraps every field in a type tag
//! (`{"stringValue": "usd"}`, `{"doubleValue": 25.5}`). Amounts are stored
//! as doubles so that dashboards and other readers see a plain number.

use std::collections::HashMap;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{Currency, PaymentRecord, PaymentStatus, StoredPayment};
use crate::ports::StoreWriteError;

pub const FIELD_AMOUNT: &str = "amount";
pub const FIELD_CURRENCY: &str = "currency";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_SOURCE_SESSION_ID: &str = "sourceSessionId";
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Document as returned by `GET .../documents/{collection}/{id}`.
///
/// The resource `name` is not kept; the id is already the session id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Encodes a record's fields. `createdAt` is left to a server transform.
pub fn encode_fields(record: &PaymentRecord) -> Result<Map<String, Value>, StoreWriteError> {
    let amount = record.amount.to_f64().ok_or_else(|| {
        StoreWriteError::Malformed(format!("Amount {} is not representable", record.amount))
    })?;

    let mut fields = Map::new();
    fields.insert(FIELD_AMOUNT.to_string(), json!({ "doubleValue": amount }));
    fields.insert(
        FIELD_CURRENCY.to_string(),
        json!({ "stringValue": record.currency.code() }),
    );
    fields.insert(
        FIELD_STATUS.to_string(),
        json!({ "stringValue": record.status.as_str() }),
    );
    fields.insert(
        FIELD_SOURCE_SESSION_ID.to_string(),
        json!({ "stringValue": record.source_session_id }),
    );
    Ok(fields)
}

fn field<'a>(doc: &'a FirestoreDocument, name: &str) -> Result<&'a Value, StoreWriteError> {
    doc.fields
        .get(name)
        .ok_or_else(|| StoreWriteError::Malformed(format!("Document field '{}' is missing", name)))
}

fn string_field<'a>(doc: &'a FirestoreDocument, name: &str) -> Result<&'a str, StoreWriteError> {
    field(doc, name)?
        .get("stringValue")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreWriteError::Malformed(format!("Field '{}' is not a string", name)))
}

/// Reads a numeric field. Other writers may have stored it as an integer,
/// which Firestore returns as a decimal string.
fn number_field(doc: &FirestoreDocument, name: &str) -> Result<f64, StoreWriteError> {
    let value = field(doc, name)?;
    let number = if let Some(d) = value.get("doubleValue") {
        d.as_f64()
    } else if let Some(i) = value.get("integerValue") {
        i.as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| i.as_i64())
            .map(|n| n as f64)
    } else {
        None
    };
    number.ok_or_else(|| StoreWriteError::Malformed(format!("Field '{}' is not a number", name)))
}

fn timestamp_field(doc: &FirestoreDocument, name: &str) -> Result<Timestamp, StoreWriteError> {
    let raw = match doc.fields.get(name) {
        Some(value) => value.get("timestampValue").and_then(Value::as_str),
        // Fall back to document metadata when the transform field is absent.
        None => doc.create_time.as_deref(),
    };
    raw.and_then(Timestamp::parse_rfc3339)
        .ok_or_else(|| StoreWriteError::Malformed(format!("Field '{}' is not a timestamp", name)))
}

/// Decodes a fetched document back into a stored payment.
pub fn decode_document(doc: &FirestoreDocument) -> Result<StoredPayment, StoreWriteError> {
    let currency = Currency::parse(string_field(doc, FIELD_CURRENCY)?)
        .map_err(|e| StoreWriteError::Malformed(e.to_string()))?;

    let raw_amount = number_field(doc, FIELD_AMOUNT)?;
    let amount = Decimal::from_f64(raw_amount)
        .ok_or_else(|| StoreWriteError::Malformed(format!("Amount {} is not finite", raw_amount)))?
        .round_dp(currency.minor_unit_exponent());

    let status_raw = string_field(doc, FIELD_STATUS)?;
    let status = PaymentStatus::parse(status_raw)
        .ok_or_else(|| StoreWriteError::Malformed(format!("Unknown status '{}'", status_raw)))?;

    Ok(StoredPayment {
        record: PaymentRecord {
            amount,
            currency,
            status,
            source_session_id: string_field(doc, FIELD_SOURCE_SESSION_ID)?.to_string(),
        },
        created_at: timestamp_field(doc, FIELD_CREATED_AT)?,
    })
}

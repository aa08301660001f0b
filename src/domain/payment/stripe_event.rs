//! Stripe webhook event envelope.
//!
//! Only the envelope fields needed for routing are captured; the
//! type-specific payload stays as raw JSON in `data.object` until a
//! handler deserializes it.

use serde::{Deserialize, Serialize};

/// A verified-or-not Stripe event as delivered to `/webhook`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// `evt_...`
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix seconds at which Stripe created the event
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The resource the event is about; its shape depends on `type`.
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Reads `data.object` as `T` without copying the payload.
    pub fn object_as<'a, T: Deserialize<'a>>(&'a self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from(self.event_type.as_str())
    }
}

/// Event types this service acts on; every other tag is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    Unknown,
}

impl StripeEventType {
    pub const CHECKOUT_SESSION_COMPLETED: &'static str = "checkout.session.completed";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => Self::CHECKOUT_SESSION_COMPLETED,
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for StripeEventType {
    /// Exact, case-sensitive match on Stripe's type tag.
    fn from(tag: &str) -> Self {
        if tag == Self::CHECKOUT_SESSION_COMPLETED {
            Self::CheckoutSessionCompleted
        } else {
            Self::Unknown
        }
    }
}

/// Test fixture: an unsigned event envelope with overridable parts.
#[cfg(test)]
pub struct StripeEventBuilder(StripeEvent);

#[cfg(test)]
impl StripeEventBuilder {
    /// A test-mode `checkout.session.completed` with an empty object.
    pub fn new() -> Self {
        Self(StripeEvent {
            id: "evt_test_123".to_string(),
            event_type: StripeEventType::CHECKOUT_SESSION_COMPLETED.to_string(),
            created: chrono::Utc::now().timestamp(),
            data: StripeEventData {
                object: serde_json::json!({}),
            },
            livemode: false,
            api_version: None,
        })
    }

    pub fn checkout_completed(session_id: &str, amount_total: i64, currency: &str) -> Self {
        Self::new().object(serde_json::json!({
            "id": session_id,
            "object": "checkout.session",
            "amount_total": amount_total,
            "currency": currency,
            "payment_status": "paid",
        }))
    }

    pub fn event_type(mut self, tag: &str) -> Self {
        self.0.event_type = tag.to_string();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.0.data.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        self.0
    }
}

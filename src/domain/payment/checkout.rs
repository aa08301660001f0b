//! Completed checkout session extracted from a verified event.

use serde::Deserialize;

use super::money::Currency;
use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Fields of a completed checkout session needed to record a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionCompleted {
    /// Processor checkout session id (cs_xxx).
    pub session_id: String,
    /// Total charged, in the currency's minor unit.
    pub amount_total: i64,
    pub currency: Currency,
}

/// Subset of Stripe's Checkout Session object.
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: Option<String>,
    amount_total: Option<i64>,
    currency: Option<String>,
}

impl CheckoutSessionCompleted {
    /// Extracts the session from a `checkout.session.completed` event.
    ///
    /// # Errors
    ///
    /// - `MissingField` - `id`, `amount_total` or `currency` absent or null
    /// - `ParseError` - object is not a session or currency is unsupported
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let object: CheckoutSessionObject = event
            .object_as()
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let session_id = object
            .id
            .filter(|id| !id.is_empty())
            .ok_or(WebhookError::MissingField("id"))?;
        let amount_total = object
            .amount_total
            .ok_or(WebhookError::MissingField("amount_total"))?;
        if amount_total < 0 {
            return Err(WebhookError::ParseError(format!(
                "negative amount_total {}",
                amount_total
            )));
        }
        let currency = object
            .currency
            .ok_or(WebhookError::MissingField("currency"))?;
        let currency =
            Currency::parse(&currency).map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(Self {
            session_id,
            amount_total,
            currency,
        })
    }
}

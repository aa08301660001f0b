//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// Where Stripe sends the customer after paying
    #[serde(default)]
    pub success_url: String,

    /// Where Stripe sends the customer after abandoning checkout
    #[serde(default)]
    pub cancel_url: String,

    /// Line item name shown on the hosted page
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Maximum webhook signature age in seconds
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,

    /// Reject test-mode events
    #[serde(default)]
    pub require_livemode: bool,

    /// Stripe API base URL (override for stripe-mock)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Deadline for a checkout session call in seconds
    #[serde(default = "default_processor_timeout")]
    pub processor_timeout_secs: u64,

    /// Use the in-process mock provider instead of Stripe (non-production only)
    #[serde(default)]
    pub use_mock_provider: bool,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    pub fn processor_timeout(&self) -> Duration {
        Duration::from_secs(self.processor_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") && !api_key.starts_with("rk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        for (field, raw) in [
            ("success_url", &self.success_url),
            ("cancel_url", &self.cancel_url),
        ] {
            let redirect =
                Url::parse(raw).map_err(|_| ValidationError::InvalidRedirectUrl(field))?;
            if !matches!(redirect.scheme(), "http" | "https") || redirect.host_str().is_none() {
                return Err(ValidationError::InvalidRedirectUrl(field));
            }
        }
        if self.product_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PRODUCT_NAME"));
        }
        if !(1..=3600).contains(&self.webhook_tolerance_secs) {
            return Err(ValidationError::InvalidWebhookTolerance);
        }
        if self.processor_timeout_secs == 0 || self.processor_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

fn default_product_name() -> String {
    "FixUp Pro Payment".to_string()
}

fn default_webhook_tolerance() -> i64 {
    300
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_processor_timeout() -> u64 {
    10
}

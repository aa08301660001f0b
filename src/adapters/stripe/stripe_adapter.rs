//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API
//! (`POST /v1/checkout/sessions`, form-encoded, basic auth with the secret
//! key as username).
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentProvider, ProcessorError, ProcessorErrorCode,
};

use super::api_types::{StripeCheckoutSession, StripeErrorResponse};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request HTTP timeout.
    request_timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (e.g., TLS backend init).
    pub fn new(config: StripeConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Form parameters for a one-off hosted payment with inline price data.
fn checkout_form_params(request: &CreateCheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        (
            "line_items[0][price_data][currency]",
            request.currency.code().to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.product_name.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount.value().to_string(),
        ),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
    ]
}

/// Maps a non-2xx Stripe response to a `ProcessorError`.
fn error_from_response(status: StatusCode, body: &str) -> ProcessorError {
    let parsed = serde_json::from_str::<StripeErrorResponse>(body).ok();

    let code = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProcessorErrorCode::AuthenticationError,
        StatusCode::TOO_MANY_REQUESTS => ProcessorErrorCode::RateLimitExceeded,
        s if s.is_client_error() => ProcessorErrorCode::InvalidRequest,
        _ => ProcessorErrorCode::ProviderError,
    };

    let message = parsed
        .as_ref()
        .and_then(|b| b.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error: HTTP {}", status.as_u16()));

    let mut err = ProcessorError::new(code, message);
    if let Some(provider_code) = parsed.and_then(|b| b.error.code.or(b.error.error_type)) {
        err = err.with_provider_code(provider_code);
    }
    err
}

fn error_from_transport(e: reqwest::Error) -> ProcessorError {
    if e.is_timeout() {
        ProcessorError::timeout(format!("Stripe request timed out: {}", e))
    } else {
        ProcessorError::network(e.to_string())
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, ProcessorError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_form_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(error_from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = error_from_response(status, &error_text);
            tracing::warn!(
                status = status.as_u16(),
                code = %err.code,
                provider_code = err.provider_code.as_deref().unwrap_or("-"),
                "Stripe rejected checkout session request"
            );
            return Err(err);
        }

        let stripe_session: StripeCheckoutSession = response.json().await.map_err(|e| {
            ProcessorError::new(
                ProcessorErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let url = stripe_session.url.ok_or_else(|| {
            ProcessorError::new(
                ProcessorErrorCode::ProviderError,
                format!("Stripe session {} has no hosted URL", stripe_session.id),
            )
        })?;

        Ok(CheckoutSession {
            id: stripe_session.id,
            url,
            expires_at: stripe_session.expires_at,
        })
    }
}

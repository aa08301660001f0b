//! CreateCheckoutSessionHandler - Command handler for starting a hosted checkout.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::domain::foundation::ValidationError;
use crate::domain::payment::{Currency, MinorUnits};
use crate::ports::{CreateCheckoutRequest, PaymentProvider, ProcessorError, ProcessorErrorCode};

/// Command to create a checkout session.
///
/// `amount` is kept as raw JSON so that floats and strings are rejected
/// here rather than coerced during deserialization.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub amount: serde_json::Value,
    pub currency: String,
}

/// Result of creating a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    /// Hosted page to redirect the customer to.
    pub url: String,
}

/// Errors from creating a checkout session.
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    /// Request rejected before contacting the processor.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The processor call failed. No local state changed.
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Fixed parameters for every checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    pub processor_timeout: Duration,
}

/// Handler for creating hosted checkout sessions.
pub struct CreateCheckoutSessionHandler {
    provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutSessionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, settings: CheckoutSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, CheckoutError> {
        let amount = MinorUnits::from_json(&cmd.amount)?;
        let currency = Currency::parse(&cmd.currency)?;

        let request = CreateCheckoutRequest {
            amount,
            currency,
            product_name: self.settings.product_name.clone(),
            success_url: self.settings.success_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        };

        let session = tokio::time::timeout(
            self.settings.processor_timeout,
            self.provider.create_checkout_session(request),
        )
        .await
        .map_err(|_| {
            ProcessorError::timeout(format!(
                "Payment processor did not respond within {:?}",
                self.settings.processor_timeout
            ))
        })??;

        let usable = Url::parse(&session.url)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false);
        if !usable {
            return Err(ProcessorError::new(
                ProcessorErrorCode::ProviderError,
                "Payment processor returned no usable checkout URL",
            )
            .into());
        }

        tracing::info!(
            session_id = %session.id,
            amount = amount.value(),
            "Checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::CheckoutSession;
    use serde_json::json;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            product_name: "FixUp Pro Payment".to_string(),
            success_url: "https://example.com/success".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
            processor_timeout: Duration::from_secs(5),
        }
    }

    fn command(amount: serde_json::Value, currency: &str) -> CreateCheckoutSessionCommand {
        CreateCheckoutSessionCommand {
            amount,
            currency: currency.to_string(),
        }
    }

    #[tokio::test]
    async fn creates_session_and_returns_url() {
        let provider = Arc::new(MockPaymentProvider::new());
        let handler = CreateCheckoutSessionHandler::new(provider.clone(), settings());

        let result = handler.handle(command(json!(2550), "USD")).await.unwrap();

        assert!(result.url.starts_with("https://"));
        let calls = provider.checkout_requests();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].amount.value(), 2550);
        assert_eq!(calls[0].currency.code(), "usd");
        assert_eq!(calls[0].product_name, "FixUp Pro Payment");
        assert_eq!(calls[0].success_url, "https://example.com/success");
    }

    #[tokio::test]
    async fn invalid_amounts_never_reach_processor() {
        let provider = Arc::new(MockPaymentProvider::new());
        let handler = CreateCheckoutSessionHandler::new(provider.clone(), settings());

        for amount in [json!(0), json!(-5), json!(25.5), json!("2550"), json!(null)] {
            let result = handler.handle(command(amount.clone(), "usd")).await;
            assert!(
                matches!(result, Err(CheckoutError::Validation(_))),
                "amount {} should be rejected",
                amount
            );
        }
        assert!(provider.checkout_requests().is_empty());
    }

    #[tokio::test]
    async fn unsupported_currency_never_reaches_processor() {
        let provider = Arc::new(MockPaymentProvider::new());
        let handler = CreateCheckoutSessionHandler::new(provider.clone(), settings());

        let result = handler.handle(command(json!(100), "doubloons")).await;

        assert!(matches!(result, Err(CheckoutError::Validation(_))));
        assert!(provider.checkout_requests().is_empty());
    }

    #[tokio::test]
    async fn processor_failure_is_surfaced() {
        let provider = Arc::new(MockPaymentProvider::new());
        provider.fail_next(ProcessorError::invalid_request("Invalid API Key provided"));
        let handler = CreateCheckoutSessionHandler::new(provider.clone(), settings());

        let result = handler.handle(command(json!(100), "usd")).await;

        match result {
            Err(CheckoutError::Processor(e)) => {
                assert_eq!(e.message, "Invalid API Key provided");
            }
            other => panic!("expected processor error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_processor_times_out() {
        let provider = Arc::new(MockPaymentProvider::new().with_delay(Duration::from_secs(3600)));
        let mut settings = settings();
        settings.processor_timeout = Duration::from_millis(50);
        let handler = CreateCheckoutSessionHandler::new(provider, settings);

        let result = handler.handle(command(json!(100), "usd")).await;

        match result {
            Err(CheckoutError::Processor(e)) => assert_eq!(e.code, ProcessorErrorCode::Timeout),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_url_is_a_processor_error() {
        let provider = Arc::new(MockPaymentProvider::new());
        provider.respond_with(CheckoutSession {
            id: "cs_no_url".to_string(),
            url: String::new(),
            expires_at: None,
        });
        let handler = CreateCheckoutSessionHandler::new(provider, settings());

        let result = handler.handle(command(json!(100), "usd")).await;

        assert!(matches!(result, Err(CheckoutError::Processor(_))));
    }

    #[tokio::test]
    async fn malformed_processor_urls_are_processor_errors() {
        for url in ["https://not a url", "https://", "checkout.stripe.com", "javascript:alert(1)"] {
            let provider = Arc::new(MockPaymentProvider::new());
            provider.respond_with(CheckoutSession {
                id: "cs_bad_url".to_string(),
                url: url.to_string(),
                expires_at: None,
            });
            let handler = CreateCheckoutSessionHandler::new(provider, settings());

            let result = handler.handle(command(json!(100), "usd")).await;

            assert!(
                matches!(result, Err(CheckoutError::Processor(_))),
                "{}",
                url
            );
        }
    }

    #[tokio::test]
    async fn well_formed_processor_url_is_returned() {
        let provider = Arc::new(MockPaymentProvider::new());
        provider.respond_with(CheckoutSession {
            id: "cs_local".to_string(),
            url: "http://localhost:4242/pay/cs_local".to_string(),
            expires_at: None,
        });
        let handler = CreateCheckoutSessionHandler::new(provider, settings());

        let result = handler.handle(command(json!(100), "usd")).await.unwrap();

        assert_eq!(result.url, "http://localhost:4242/pay/cs_local");
    }
}

//! Payment provider port for hosted checkout.
//!
//! Defines the contract for creating a hosted checkout session with an
//! external processor (e.g., Stripe). The customer completes payment on the
//! processor's page; the result arrives later as a webhook.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{Currency, MinorUnits};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session for a one-off payment.
    ///
    /// Returns the session including the URL to redirect the customer to.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, ProcessorError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckoutRequest {
    /// Amount in the currency's minor unit.
    pub amount: MinorUnits,

    pub currency: Currency,

    /// Line item name shown on the hosted page.
    pub product_name: String,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for customer to complete checkout.
    pub url: String,

    /// When the session expires (Unix timestamp).
    pub expires_at: Option<i64>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorError {
    /// Error code for categorization.
    pub code: ProcessorErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,
}

impl ProcessorError {
    pub fn new(code: ProcessorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Attach the provider's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::InvalidRequest, message)
    }
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProcessorError {}

impl From<ProcessorError> for DomainError {
    fn from(err: ProcessorError) -> Self {
        let code = match err.code {
            ProcessorErrorCode::Timeout => ErrorCode::Timeout,
            _ => ErrorCode::ExternalServiceError,
        };

        DomainError::new(code, err.message)
    }
}

/// Processor error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Call exceeded its deadline.
    Timeout,

    /// API authentication failed.
    AuthenticationError,

    /// Processor rejected the request parameters.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ProviderError,
}

impl std::fmt::Display for ProcessorErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessorErrorCode::NetworkError => "network_error",
            ProcessorErrorCode::Timeout => "timeout",
            ProcessorErrorCode::AuthenticationError => "authentication_error",
            ProcessorErrorCode::InvalidRequest => "invalid_request",
            ProcessorErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ProcessorErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn PaymentProvider) {}
    }

    #[test]
    fn processor_error_display() {
        let err = ProcessorError::invalid_request("Invalid currency: zzz");
        assert_eq!(err.to_string(), "invalid_request: Invalid currency: zzz");
    }

    #[test]
    fn processor_error_with_provider_code() {
        let err = ProcessorError::invalid_request("bad").with_provider_code("parameter_invalid");
        assert_eq!(err.provider_code.as_deref(), Some("parameter_invalid"));
    }

    #[test]
    fn timeout_converts_to_timeout_domain_error() {
        let err: DomainError = ProcessorError::timeout("slow").into();
        assert_eq!(err.code, ErrorCode::Timeout);
    }

    #[test]
    fn other_errors_convert_to_external_service_error() {
        let err: DomainError = ProcessorError::network("reset").into();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert_eq!(err.message(), "reset");
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let json = serde_json::to_string(&ProcessorErrorCode::RateLimitExceeded).unwrap();
        assert_eq!(json, "\"rate_limit_exceeded\"");
    }
}

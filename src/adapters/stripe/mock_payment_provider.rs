//! Mock payment provider for testing and local development.
//!
//! Provides a configurable implementation of `PaymentProvider`. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking
//! - Artificial latency

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{CheckoutSession, CreateCheckoutRequest, PaymentProvider, ProcessorError};

/// Mock payment provider.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.fail_next(ProcessorError::network("connection reset"));
/// let result = mock.create_checkout_session(request).await;
/// assert_eq!(mock.checkout_requests().len(), 1);
/// ```
#[derive(Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct MockState {
    /// Next checkout session to return.
    next_checkout: Option<CheckoutSession>,

    /// Error to return on next call.
    next_error: Option<ProcessorError>,

    /// Requests received, in order.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Sessions created so far (for generated ids).
    sessions_created: u64,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the session to return on the next call.
    pub fn respond_with(&self, session: CheckoutSession) {
        self.state().next_checkout = Some(session);
    }

    /// Fail the next call with this error.
    pub fn fail_next(&self, error: ProcessorError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    /// Requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, ProcessorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        state.checkout_requests.push(request);

        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        if let Some(session) = state.next_checkout.take() {
            return Ok(session);
        }

        state.sessions_created += 1;
        let id = format!("cs_mock_{}", state.sessions_created);
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
            expires_at: Some(chrono::Utc::now().timestamp() + 24 * 60 * 60),
        })
    }
}

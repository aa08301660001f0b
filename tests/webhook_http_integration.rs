//! Integration tests for the webhook endpoint.
//!
//! Requests go through the full router (request id, tracing, CORS and
//! timeout layers) with an in-memory store behind it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::json;
use sha2::Sha256;
use tower::ServiceExt;

use payment_intake::adapters::http::{app_router, HttpSettings, PaymentAppState};
use payment_intake::adapters::memory::InMemoryPaymentRepository;
use payment_intake::adapters::stripe::MockPaymentProvider;
use payment_intake::application::{
    CheckoutSettings, CreateCheckoutSessionHandler, HandlePaymentWebhookHandler,
    RecordPaymentHandler,
};
use payment_intake::domain::payment::{
    PaymentRecord, PaymentStatus, StoredPayment, StripeWebhookVerifier,
};
use payment_intake::ports::{
    FailureNotifier, PaymentRepository, RecordFailure, RecordFailureKind, SaveResult,
    StoreWriteError,
};

const SECRET: &str = "whsec_integration_secret";

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Default)]
struct CollectingNotifier {
    failures: Mutex<Vec<RecordFailure>>,
}

#[async_trait]
impl FailureNotifier for CollectingNotifier {
    async fn notify_record_failed(&self, failure: &RecordFailure) {
        self.failures.lock().unwrap().push(failure.clone());
    }
}

/// Store that is always down.
struct UnreachableStore;

#[async_trait]
impl PaymentRepository for UnreachableStore {
    async fn create_if_absent(&self, _: &PaymentRecord) -> Result<SaveResult, StoreWriteError> {
        Err(StoreWriteError::Unavailable("connection refused".to_string()))
    }

    async fn find_by_source_session_id(
        &self,
        _: &str,
    ) -> Result<Option<StoredPayment>, StoreWriteError> {
        Err(StoreWriteError::Unavailable("connection refused".to_string()))
    }
}

struct TestApp {
    router: Router,
    notifier: Arc<CollectingNotifier>,
}

fn app_with_store(repository: Arc<dyn PaymentRepository>) -> TestApp {
    let notifier = Arc::new(CollectingNotifier::default());
    let recorder = Arc::new(RecordPaymentHandler::new(
        repository,
        Duration::from_secs(5),
    ));
    let state = PaymentAppState {
        webhook_handler: Arc::new(HandlePaymentWebhookHandler::new(
            Arc::new(StripeWebhookVerifier::new(SECRET)),
            recorder,
            notifier.clone(),
        )),
        checkout_handler: Arc::new(CreateCheckoutSessionHandler::new(
            Arc::new(MockPaymentProvider::new()),
            CheckoutSettings {
                product_name: "FixUp Pro Payment".to_string(),
                success_url: "https://app.example.com/payment-success".to_string(),
                cancel_url: "https://app.example.com/payment-cancel".to_string(),
                processor_timeout: Duration::from_secs(5),
            },
        )),
    };
    TestApp {
        router: app_router(state, &HttpSettings::default()),
        notifier,
    }
}

fn sign(payload: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

fn checkout_completed(event_id: &str, session_id: &str, amount_total: i64, currency: &str) -> String {
    json!({
        "id": event_id,
        "object": "event",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "amount_total": amount_total,
                "currency": currency,
                "payment_status": "paid"
            }
        }
    })
    .to_string()
}

fn webhook_request(payload: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("Stripe-Signature", sig);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Verification
// =============================================================================

#[tokio::test]
async fn missing_signature_is_rejected_without_write() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_123", 2550, "usd");

    let (status, body) = send(&app.router, webhook_request(&payload, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn wrong_secret_is_rejected_without_write() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_123", 2550, "usd");
    let now = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(b"whsec_someone_else").unwrap();
    mac.update(format!("{}.{}", now, payload).as_bytes());
    let forged = format!("t={},v1={}", now, hex::encode(mac.finalize().into_bytes()));

    let (status, _) = send(&app.router, webhook_request(&payload, Some(&forged))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_123", 2550, "usd");
    let signature = sign(&payload, chrono::Utc::now().timestamp());
    let tampered = payload.replace("2550", "1");

    let (status, _) = send(&app.router, webhook_request(&tampered, Some(&signature))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn stale_signature_is_rejected() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_123", 2550, "usd");
    let signature = sign(&payload, chrono::Utc::now().timestamp() - 3600);

    let (status, body) = send(&app.router, webhook_request(&payload, Some(&signature))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TIMESTAMP");
}

// =============================================================================
// Recording
// =============================================================================

#[tokio::test]
async fn completed_checkout_is_recorded() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_123", 2550, "usd");
    let signature = sign(&payload, chrono::Utc::now().timestamp());

    let (status, body) = send(&app.router, webhook_request(&payload, Some(&signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"received": true}));

    let stored = repository
        .find_by_source_session_id("cs_test_123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.record.amount, Decimal::new(2550, 2));
    assert_eq!(stored.record.currency.code(), "usd");
    assert_eq!(stored.record.status, PaymentStatus::Paid);
    assert_eq!(
        serde_json::to_value(&stored.record).unwrap(),
        json!({
            "amount": 25.5,
            "currency": "usd",
            "status": "Paid",
            "sourceSessionId": "cs_test_123"
        })
    );
}

#[tokio::test]
async fn redelivered_event_is_recorded_once() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_123", 2550, "usd");

    for _ in 0..3 {
        let signature = sign(&payload, chrono::Utc::now().timestamp());
        let (status, body) =
            send(&app.router, webhook_request(&payload, Some(&signature))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"received": true}));
    }

    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn concurrent_deliveries_record_once() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_1", "cs_test_race", 1000, "eur");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let router = app.router.clone();
        let payload = payload.clone();
        tasks.push(tokio::spawn(async move {
            let signature = sign(&payload, chrono::Utc::now().timestamp());
            router
                .oneshot(webhook_request(&payload, Some(&signature)))
                .await
                .unwrap()
                .status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn zero_decimal_currency_is_not_divided() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = checkout_completed("evt_jp", "cs_test_jpy", 5000, "jpy");
    let signature = sign(&payload, chrono::Utc::now().timestamp());

    send(&app.router, webhook_request(&payload, Some(&signature))).await;

    let stored = repository
        .find_by_source_session_id("cs_test_jpy")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.record.amount, Decimal::from(5000));
}

#[tokio::test]
async fn other_event_types_are_acknowledged_without_write() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = json!({
        "id": "evt_pi",
        "type": "payment_intent.succeeded",
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": { "id": "pi_123" } }
    })
    .to_string();
    let signature = sign(&payload, chrono::Utc::now().timestamp());

    let (status, body) = send(&app.router, webhook_request(&payload, Some(&signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"received": true}));
    assert!(repository.is_empty().await);
}

// =============================================================================
// Failure Reporting
// =============================================================================

#[tokio::test]
async fn store_outage_is_acknowledged_and_reported() {
    let app = app_with_store(Arc::new(UnreachableStore));
    let payload = checkout_completed("evt_down", "cs_test_down", 2550, "usd");
    let signature = sign(&payload, chrono::Utc::now().timestamp());

    let (status, body) = send(&app.router, webhook_request(&payload, Some(&signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"received": true}));

    let failures = app.notifier.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, RecordFailureKind::StoreWrite);
    assert_eq!(failures[0].event_id, "evt_down");
    assert_eq!(failures[0].source_session_id.as_deref(), Some("cs_test_down"));
}

#[tokio::test]
async fn checkout_event_without_amount_is_reported() {
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let app = app_with_store(repository.clone());
    let payload = json!({
        "id": "evt_bad",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": { "id": "cs_test_bad", "currency": "usd" } }
    })
    .to_string();
    let signature = sign(&payload, chrono::Utc::now().timestamp());

    let (status, _) = send(&app.router, webhook_request(&payload, Some(&signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(repository.is_empty().await);
    let failures = app.notifier.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, RecordFailureKind::InvalidEvent);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app_with_store(Arc::new(InMemoryPaymentRepository::new()));

    let response = app
        .router
        .clone()
        .oneshot(webhook_request("{}", None))
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

//! Startup wiring: turns configuration into the shared application state.
//!
//! Everything here runs once, before the listener is bound. Failures are
//! fatal so that bad credentials surface at deploy time, not on the first
//! paid checkout.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;

use crate::adapters::alerting::TracingFailureNotifier;
use crate::adapters::firestore::{
    CredentialsError, FirestorePaymentRepository, ServiceAccountCredentials,
};
use crate::adapters::http::PaymentAppState;
use crate::adapters::memory::InMemoryPaymentRepository;
use crate::adapters::postgres::{self, PostgresPaymentRepository};
use crate::adapters::stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
use crate::application::{
    CheckoutSettings, CreateCheckoutSessionHandler, HandlePaymentWebhookHandler,
    RecordPaymentHandler,
};
use crate::config::{AppConfig, ConfigError, PaymentConfig, StoreBackend, StoreConfig};
use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{PaymentProvider, PaymentRepository};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid store credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("Store configuration incomplete: {0}")]
    StoreConfig(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to bind listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Constructs the payment store selected by `store.backend`.
pub async fn build_payment_repository(
    store: &StoreConfig,
) -> Result<Arc<dyn PaymentRepository>, StartupError> {
    let repository: Arc<dyn PaymentRepository> = match store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory payment store; records are lost on restart");
            Arc::new(InMemoryPaymentRepository::new())
        }
        StoreBackend::Postgres => {
            let database = store
                .database
                .as_ref()
                .ok_or(StartupError::StoreConfig("store.database is required"))?;
            let pool = postgres::connect(database).await?;
            Arc::new(PostgresPaymentRepository::new(pool))
        }
        StoreBackend::Firestore => Arc::new(build_firestore_repository(store)?),
    };

    tracing::info!(backend = store.backend.as_str(), "Payment store ready");
    Ok(repository)
}

fn build_firestore_repository(
    store: &StoreConfig,
) -> Result<FirestorePaymentRepository, StartupError> {
    if let Some(host) = store.emulator_host.as_deref() {
        tracing::info!(host = %host, "Using Firestore emulator");
        return Ok(FirestorePaymentRepository::for_emulator(
            host,
            store.emulator_project_id.clone(),
            store.collection.clone(),
            store.write_timeout(),
        )?);
    }

    let credentials = if let Some(inline) = store.service_account.as_ref() {
        ServiceAccountCredentials::from_json(inline.expose_secret())?
    } else if let Some(path) = store.service_account_path.as_deref() {
        ServiceAccountCredentials::from_file(path)?
    } else {
        return Err(StartupError::StoreConfig(
            "Firestore needs service_account or service_account_path",
        ));
    };

    tracing::info!(
        project_id = %credentials.project_id,
        client_email = %credentials.client_email,
        collection = %store.collection,
        "Firestore credentials loaded"
    );

    Ok(FirestorePaymentRepository::from_credentials(
        credentials,
        store.collection.clone(),
        store.write_timeout(),
    )?)
}

/// Constructs the checkout processor client.
pub fn build_payment_provider(
    payment: &PaymentConfig,
) -> Result<Arc<dyn PaymentProvider>, StartupError> {
    if payment.use_mock_provider {
        tracing::warn!("Using mock payment provider; no real checkout sessions are created");
        return Ok(Arc::new(MockPaymentProvider::new()));
    }

    let config = StripeConfig::new(payment.stripe_api_key.expose_secret().clone())
        .with_base_url(payment.api_base_url.clone())
        .with_request_timeout(payment.processor_timeout());

    Ok(Arc::new(StripePaymentAdapter::new(config)?))
}

/// Wires handlers from already-constructed adapters.
pub fn build_app_state(
    config: &AppConfig,
    repository: Arc<dyn PaymentRepository>,
    provider: Arc<dyn PaymentProvider>,
) -> PaymentAppState {
    let verifier = StripeWebhookVerifier::new(
        config.payment.stripe_webhook_secret.expose_secret().clone(),
    )
    .with_tolerance_secs(config.payment.webhook_tolerance_secs)
    .with_require_livemode(config.payment.require_livemode);

    let recorder = Arc::new(RecordPaymentHandler::new(
        repository,
        config.store.write_timeout(),
    ));

    let webhook_handler = Arc::new(HandlePaymentWebhookHandler::new(
        Arc::new(verifier),
        recorder,
        Arc::new(TracingFailureNotifier::new()),
    ));

    let checkout_handler = Arc::new(CreateCheckoutSessionHandler::new(
        provider,
        CheckoutSettings {
            product_name: config.payment.product_name.clone(),
            success_url: config.payment.success_url.clone(),
            cancel_url: config.payment.cancel_url.clone(),
            processor_timeout: config.payment.processor_timeout(),
        },
    ));

    PaymentAppState {
        webhook_handler,
        checkout_handler,
    }
}

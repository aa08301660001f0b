use payment_intake::adapters::http::{app_router, HttpSettings};
use payment_intake::bootstrap::{
    build_app_state, build_payment_provider, build_payment_repository, StartupError,
};
use payment_intake::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate().map_err(payment_intake::config::ConfigError::from)?;

    tracing::info!(
        environment = ?config.server.environment,
        store = config.store.backend.as_str(),
        stripe_test_mode = config.payment.is_test_mode(),
        "Starting payment intake"
    );

    // Store and processor clients are built once; bad credentials stop here.
    let repository = build_payment_repository(&config.store).await?;
    let provider = build_payment_provider(&config.payment)?;
    let state = build_app_state(&config, repository, provider);

    let settings = HttpSettings {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = app_router(state, &settings);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "Payment intake listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Payment intake stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Tracing may not be initialized yet if configuration failed to load.
        eprintln!("payment-intake: {}", e);
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

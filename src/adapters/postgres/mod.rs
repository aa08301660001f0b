//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Payment records with a unique session key
//! - `connect` - Pool construction from `DatabaseConfig`

mod payment_repository;

pub use payment_repository::PostgresPaymentRepository;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Opens a connection pool and, if configured, applies embedded migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(config.url.expose_secret())
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

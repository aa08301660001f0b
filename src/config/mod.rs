//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAYMENT_INTAKE__` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use payment_intake::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}:{}", config.server.host, config.server.port);
//! ```

mod database;
mod error;
mod payment;
mod server;
mod store;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,

    /// Payment store configuration (Firestore, PostgreSQL, in-memory)
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAYMENT_INTAKE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Lets the plain `PORT` variable override `server.port`
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYMENT_INTAKE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYMENT_INTAKE__PAYMENT__STRIPE_API_KEY=...` -> `payment.stripe_api_key = ...`
    /// - `PAYMENT_INTAKE__STORE__DATABASE__URL=...` -> `store.database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let port_override = std::env::var("PORT").ok().filter(|p| !p.is_empty());

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYMENT_INTAKE")
                    .separator("__"),
            )
            .set_override_option("server.port", port_override)?
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Stripe key prefixes and redirect URLs
    /// - Store backend requirements (credentials, database URL)
    /// - Production-specific restrictions (no in-memory store, no emulator)
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate()?;
        self.store.validate(&self.server.environment)?;
        if self.payment.use_mock_provider && self.is_production() {
            return Err(ValidationError::BackendNotAllowedInProduction(
                "mock payment provider",
            ));
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PAYMENT_INTAKE__PAYMENT__STRIPE_API_KEY",
        "PAYMENT_INTAKE__PAYMENT__STRIPE_WEBHOOK_SECRET",
        "PAYMENT_INTAKE__PAYMENT__SUCCESS_URL",
        "PAYMENT_INTAKE__PAYMENT__CANCEL_URL",
        "PAYMENT_INTAKE__STORE__BACKEND",
        "PAYMENT_INTAKE__STORE__EMULATOR_HOST",
        "PAYMENT_INTAKE__STORE__DATABASE__URL",
        "PAYMENT_INTAKE__SERVER__PORT",
        "PAYMENT_INTAKE__SERVER__ENVIRONMENT",
        "PORT",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var("PAYMENT_INTAKE__PAYMENT__STRIPE_API_KEY", "sk_test_xxx");
        env::set_var("PAYMENT_INTAKE__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx");
        env::set_var(
            "PAYMENT_INTAKE__PAYMENT__SUCCESS_URL",
            "https://app.example.com/payment-success",
        );
        env::set_var(
            "PAYMENT_INTAKE__PAYMENT__CANCEL_URL",
            "https://app.example.com/payment-cancel",
        );
        env::set_var("PAYMENT_INTAKE__STORE__EMULATOR_HOST", "localhost:8080");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();

        assert_eq!(config.payment.stripe_api_key.expose_secret(), "sk_test_xxx");
        assert_eq!(config.store.emulator_host.as_deref(), Some("localhost:8080"));
        assert_eq!(config.payment.product_name, "FixUp Pro Payment");
    }

    #[test]
    fn test_validate_full_config() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_server_defaults() {
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4242);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_custom_server_port() {
        let config = load_with(&[("PAYMENT_INTAKE__SERVER__PORT", "3000")]).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_plain_port_variable_overrides() {
        let config = load_with(&[
            ("PAYMENT_INTAKE__SERVER__PORT", "3000"),
            ("PORT", "8081"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_is_production() {
        let config = load_with(&[("PAYMENT_INTAKE__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        // Emulator is not acceptable in production
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgres_backend_from_environment() {
        let config = load_with(&[
            ("PAYMENT_INTAKE__STORE__BACKEND", "postgres"),
            (
                "PAYMENT_INTAKE__STORE__DATABASE__URL",
                "postgresql://payments@localhost/payments",
            ),
        ])
        .unwrap();

        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert!(config.store.database.is_some());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_payment_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        assert!(matches!(AppConfig::load(), Err(ConfigError::LoadError(_))));
    }
}

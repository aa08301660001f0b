//! Payment store configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::database::DatabaseConfig;
use super::error::ValidationError;
use super::server::Environment;

/// Which `PaymentRepository` implementation to construct at startup
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Firestore,
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Firestore => "firestore",
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Payment store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Firestore collection holding payment documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Deadline for a single record write in seconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Service-account key JSON, inline
    pub service_account: Option<SecretString>,

    /// Path to a service-account key file
    pub service_account_path: Option<String>,

    /// Firestore emulator `host:port`; disables OAuth2
    pub emulator_host: Option<String>,

    /// Project id when using the emulator
    #[serde(default = "default_emulator_project")]
    pub emulator_project_id: String,

    /// PostgreSQL settings for the `postgres` backend
    pub database: Option<DatabaseConfig>,
}

impl StoreConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Validate store configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.write_timeout_secs == 0 || self.write_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }

        match self.backend {
            StoreBackend::Memory => {
                if *environment == Environment::Production {
                    return Err(ValidationError::BackendNotAllowedInProduction("memory"));
                }
            }
            StoreBackend::Postgres => {
                self.database
                    .as_ref()
                    .ok_or(ValidationError::MissingRequired("STORE__DATABASE__URL"))?
                    .validate()?;
            }
            StoreBackend::Firestore => {
                if self.collection.is_empty()
                    || self.collection.contains('/')
                    || self.collection.starts_with("__")
                {
                    return Err(ValidationError::InvalidCollection);
                }
                if self.service_account.is_none()
                    && self.service_account_path.is_none()
                    && self.emulator_host.is_none()
                {
                    return Err(ValidationError::MissingFirestoreCredentials);
                }
                if self.emulator_host.is_some() && *environment == Environment::Production {
                    return Err(ValidationError::BackendNotAllowedInProduction(
                        "firestore emulator",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            collection: default_collection(),
            write_timeout_secs: default_write_timeout(),
            service_account: None,
            service_account_path: None,
            emulator_host: None,
            emulator_project_id: default_emulator_project(),
            database: None,
        }
    }
}

fn default_collection() -> String {
    "payments".to_string()
}

fn default_write_timeout() -> u64 {
    10
}

fn default_emulator_project() -> String {
    "demo-payment-intake".to_string()
}

//! Listener, environment and cross-origin settings

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;

/// Deployment environment; production turns on JSON logs and stricter checks
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Overridden by the plain `PORT` variable when present
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound for a whole request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated browser origins allowed to call the API.
    /// Unset, empty or `*` allows any origin.
    pub cors_origins: Option<String>,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Explicit origin allow-list, or `None` for any origin.
    pub fn cors_origins_list(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .as_deref()?
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            None
        } else {
            Some(origins)
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        for origin in self.cors_origins_list().unwrap_or_default() {
            // An origin is scheme, host and optional port; nothing else.
            let bare = match Url::parse(&origin) {
                Ok(parsed) => {
                    matches!(parsed.scheme(), "http" | "https")
                        && parsed.host_str().is_some()
                        && parsed.path() == "/"
                        && parsed.query().is_none()
                        && parsed.fragment().is_none()
                        && parsed.username().is_empty()
                }
                Err(_) => false,
            };
            if !bare {
                return Err(ValidationError::InvalidCorsOrigin(origin));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4242
}

fn default_log_level() -> String {
    "info,payment_intake=debug,tower_http=info,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origins(origins: &str) -> ServerConfig {
        ServerConfig {
            cors_origins: Some(origins.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_listen_on_4242_in_development() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 4242);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn origins_are_trimmed_and_lose_trailing_slash() {
        let config = with_origins(" https://fixup.example/ , http://localhost:5173,");
        assert_eq!(
            config.cors_origins_list(),
            Some(vec![
                "https://fixup.example".to_string(),
                "http://localhost:5173".to_string()
            ])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn wildcard_or_blank_origins_mean_any() {
        assert_eq!(ServerConfig::default().cors_origins_list(), None);
        assert_eq!(with_origins("").cors_origins_list(), None);
        assert_eq!(with_origins("https://a.example,*").cors_origins_list(), None);
    }

    #[test]
    fn origin_with_path_is_rejected() {
        assert_eq!(
            with_origins("https://fixup.example/app").validate(),
            Err(ValidationError::InvalidCorsOrigin(
                "https://fixup.example/app".to_string()
            ))
        );
        assert!(with_origins("fixup.example").validate().is_err());
    }

    #[test]
    fn malformed_or_decorated_origins_are_rejected() {
        for origin in [
            "https://fix up.example",
            "https://:::",
            "https://fixup.example?x=1",
            "https://fixup.example#top",
            "https://user@fixup.example",
            "ftp://fixup.example",
        ] {
            assert_eq!(
                with_origins(origin).validate(),
                Err(ValidationError::InvalidCorsOrigin(origin.to_string())),
                "{}",
                origin
            );
        }
        assert!(with_origins("http://localhost:5173").validate().is_ok());
    }

    #[test]
    fn port_and_timeout_bounds() {
        let no_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(no_port.validate(), Err(ValidationError::InvalidPort));

        for secs in [0, 301] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }
}

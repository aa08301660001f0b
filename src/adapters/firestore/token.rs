//! OAuth2 access tokens for the Firestore REST API.
//!
//! Service accounts use the JWT-bearer grant: sign a short-lived assertion
//! with the account's RSA key, exchange it at the token endpoint, and cache
//! the resulting access token until shortly before it expires.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::ports::StoreWriteError;

use super::credentials::ServiceAccountCredentials;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Supplies bearer tokens for Firestore requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<SecretString, StoreWriteError>;
}

/// Fixed token, for the Firestore emulator (which accepts `Bearer owner`).
pub struct StaticTokenSource(SecretString);

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<SecretString, StoreWriteError> {
        Ok(SecretString::new(self.0.expose_secret().clone()))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: SecretString,
    expires_at: i64,
}

/// Token source backed by a service account.
pub struct ServiceAccountTokenSource {
    credentials: ServiceAccountCredentials,
    http_client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(credentials: ServiceAccountCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            http_client,
            cached: Mutex::new(None),
        }
    }

    /// Signs the JWT-bearer assertion for the token exchange.
    fn sign_assertion(&self, now: i64) -> Result<String, StoreWriteError> {
        let claims = AssertionClaims {
            iss: &self.credentials.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.credentials.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.credentials.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, self.credentials.signing_key())
            .map_err(|e| StoreWriteError::Rejected(format!("Failed to sign token assertion: {}", e)))
    }

    async fn fetch_token(&self, now: i64) -> Result<CachedToken, StoreWriteError> {
        let assertion = self.sign_assertion(now)?;

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StoreWriteError::Unavailable(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "OAuth2 token exchange failed");
            return Err(if status.is_server_error() {
                StoreWriteError::Unavailable(format!("Token endpoint returned {}", status))
            } else {
                StoreWriteError::Rejected(format!("Token exchange rejected: {}", body))
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreWriteError::Malformed(format!("Invalid token response: {}", e)))?;

        tracing::debug!(expires_in = token.expires_in, "Obtained Firestore access token");

        Ok(CachedToken {
            token: SecretString::new(token.access_token),
            expires_at: now + token.expires_in,
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<SecretString, StoreWriteError> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(SecretString::new(token.token.expose_secret().clone()));
            }
        }

        let fresh = self.fetch_token(now).await?;
        let token = SecretString::new(fresh.token.expose_secret().clone());
        *cached = Some(fresh);
        Ok(token)
    }
}

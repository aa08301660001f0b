//! Firestore implementation of `PaymentRepository`.
//!
//! Records live at `{collection}/{source_session_id}`. Creation is a single
//! `:commit` with a `currentDocument.exists = false` precondition, so two
//! concurrent deliveries of the same event cannot both insert. `createdAt`
//! is filled by a `REQUEST_TIME` server transform.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::domain::payment::{PaymentRecord, StoredPayment};
use crate::ports::{PaymentRepository, SaveResult, StoreWriteError};

use super::credentials::ServiceAccountCredentials;
use super::document::{decode_document, encode_fields, FirestoreDocument, FIELD_CREATED_AT};
use super::token::{ServiceAccountTokenSource, StaticTokenSource, TokenSource};

const DEFAULT_API_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Outcome of a failed Firestore call, before mapping to the port's error.
#[derive(Debug, PartialEq, Eq)]
enum FailedCall {
    AlreadyExists,
    NotFound,
    Error(StoreWriteError),
}

fn classify_failure(status: StatusCode, body: &str) -> FailedCall {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let rpc_status = parsed.as_ref().map(|e| e.error.status.as_str()).unwrap_or("");

    if status == StatusCode::CONFLICT || rpc_status == "ALREADY_EXISTS" {
        return FailedCall::AlreadyExists;
    }
    if status == StatusCode::NOT_FOUND {
        return FailedCall::NotFound;
    }

    let message = parsed
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Firestore returned HTTP {}", status.as_u16()));

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        FailedCall::Error(StoreWriteError::Unavailable(message))
    } else {
        FailedCall::Error(StoreWriteError::Rejected(message))
    }
}

fn transport_error(e: reqwest::Error) -> StoreWriteError {
    StoreWriteError::Unavailable(format!("Firestore request failed: {}", e))
}

/// Firestore document ids may not contain '/' nor be '.' or '..'.
fn validate_document_id(id: &str) -> Result<(), StoreWriteError> {
    if id.is_empty() || id == "." || id == ".." || id.contains('/') {
        return Err(StoreWriteError::Rejected(format!(
            "'{}' is not a valid document id",
            id
        )));
    }
    Ok(())
}

/// Payment repository backed by Cloud Firestore (or its emulator).
pub struct FirestorePaymentRepository {
    http_client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    api_base_url: String,
    project_id: String,
    collection: String,
}

impl FirestorePaymentRepository {
    pub fn new(
        http_client: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        project_id: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            tokens,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            project_id: project_id.into(),
            collection: collection.into(),
        }
    }

    /// Production Firestore, authenticated as the given service account.
    pub fn from_credentials(
        credentials: ServiceAccountCredentials,
        collection: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(request_timeout).build()?;
        let project_id = credentials.project_id.clone();
        let tokens = Arc::new(ServiceAccountTokenSource::new(
            credentials,
            http_client.clone(),
        ));
        Ok(Self::new(http_client, tokens, project_id, collection))
    }

    /// Local Firestore emulator at `host` (e.g. `localhost:8080`).
    pub fn for_emulator(
        host: &str,
        project_id: impl Into<String>,
        collection: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self::new(
            http_client,
            Arc::new(StaticTokenSource::new(EMULATOR_TOKEN)),
            project_id,
            collection,
        )
        .with_base_url(format!("http://{}/v1", host.trim_end_matches('/'))))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn document_name(&self, id: &str) -> String {
        format!("{}/{}/{}", self.database_path(), self.collection, id)
    }

    fn commit_body(&self, record: &PaymentRecord) -> Result<serde_json::Value, StoreWriteError> {
        Ok(json!({
            "writes": [{
                "update": {
                    "name": self.document_name(&record.source_session_id),
                    "fields": encode_fields(record)?,
                },
                "updateTransforms": [{
                    "fieldPath": FIELD_CREATED_AT,
                    "setToServerValue": "REQUEST_TIME",
                }],
                "currentDocument": { "exists": false },
            }]
        }))
    }
}

#[async_trait]
impl PaymentRepository for FirestorePaymentRepository {
    async fn create_if_absent(
        &self,
        record: &PaymentRecord,
    ) -> Result<SaveResult, StoreWriteError> {
        validate_document_id(&record.source_session_id)?;

        let body = self.commit_body(record)?;
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}:commit", self.api_base_url, self.database_path());

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(SaveResult::Inserted);
        }

        let text = response.text().await.unwrap_or_default();
        match classify_failure(status, &text) {
            FailedCall::AlreadyExists => Ok(SaveResult::AlreadyExists),
            FailedCall::NotFound => Err(StoreWriteError::Rejected(format!(
                "Database for project {} not found",
                self.project_id
            ))),
            FailedCall::Error(err) => {
                tracing::warn!(
                    status = status.as_u16(),
                    source_session_id = %record.source_session_id,
                    "Firestore commit failed"
                );
                Err(err)
            }
        }
    }

    async fn find_by_source_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<StoredPayment>, StoreWriteError> {
        validate_document_id(session_id)?;

        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}", self.api_base_url, self.document_name(session_id));

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match classify_failure(status, &text) {
                FailedCall::NotFound => Ok(None),
                FailedCall::AlreadyExists => Err(StoreWriteError::Malformed(
                    "Unexpected ALREADY_EXISTS on read".to_string(),
                )),
                FailedCall::Error(err) => Err(err),
            };
        }

        let doc: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| StoreWriteError::Malformed(format!("Invalid document: {}", e)))?;
        decode_document(&doc).map(Some)
    }
}

//! REST client for the Info-RTU session protocol.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::types::{RtuEnvelope, RtuExternalProject, RtuFilter, SessionResult};

/// Partner account used to open sessions.
#[derive(Debug, Clone)]
pub struct RtuCredentials {
    pub username: String,
    pub password: String,
}

/// HTTP client for the Info-RTU API.
pub struct InfoRtuClient {
    client: reqwest::Client,
    api_url: String,
    credentials: RtuCredentials,
}

/// Errors from the Info-RTU API layer.
#[derive(Debug, thiserror::Error)]
pub enum RtuApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Credentials refused or session no longer valid (401/403).
    #[error("Info-RTU refused access ({status})")]
    Forbidden { status: u16 },

    /// Any other non-2xx status code.
    #[error("Info-RTU API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// Transport succeeded but the envelope status was not `OK`.
    #[error("Info-RTU answered with status {0:?}")]
    Status(Option<String>),

    /// `POST /session` succeeded without a session id.
    #[error("Info-RTU session response has no sessionId")]
    MissingSessionId,
}

impl RtuApiError {
    /// Whether the failure means the credentials or session were refused.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

impl InfoRtuClient {
    /// * `api_url` - Base URL, e.g. `https://rtu.example.org/api`.
    pub fn new(api_url: String, credentials: RtuCredentials) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, credentials)
    }

    /// Reuse an existing [`reqwest::Client`] (shared pool and timeouts).
    pub fn with_client(client: reqwest::Client, api_url: String, credentials: RtuCredentials) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Open a session and return its id.
    pub async fn open_session(&self) -> Result<String, RtuApiError> {
        let body = serde_json::json!({
            "username": self.credentials.username,
            "password": self.credentials.password,
        });

        let response = self
            .client
            .post(format!("{}/session", self.api_url))
            .json(&body)
            .send()
            .await?;

        let envelope: RtuEnvelope<SessionResult> = Self::parse_response(response).await?;
        session_id_from(envelope)
    }

    /// Attach a filter to a session.
    pub async fn set_filter(&self, session_id: &str, filter: &RtuFilter) -> Result<(), RtuApiError> {
        let response = self
            .client
            .post(format!("{}/session/{}/filter", self.api_url, session_id))
            .json(filter)
            .send()
            .await?;

        let envelope: RtuEnvelope<serde_json::Value> = Self::parse_response(response).await?;
        ensure_ok(&envelope)
    }

    /// Read the projects matching the session's current filter.
    pub async fn list_projects(&self, session_id: &str) -> Result<Vec<RtuExternalProject>, RtuApiError> {
        let response = self
            .client
            .get(format!("{}/session/{}/projects", self.api_url, session_id))
            .send()
            .await?;

        let envelope: RtuEnvelope<Vec<serde_json::Value>> = Self::parse_response(response).await?;
        projects_from(envelope)
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RtuApiError> {
        let status = response.status();
        if let Some(error) = classify_status(status) {
            let error = match error {
                RtuApiError::ApiError { status, .. } => RtuApiError::ApiError {
                    status,
                    body: response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<unreadable body>".to_string()),
                },
                other => other,
            };
            return Err(error);
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RtuApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Map a transport status to an error, `None` for 2xx.
fn classify_status(status: StatusCode) -> Option<RtuApiError> {
    if status.is_success() {
        None
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Some(RtuApiError::Forbidden {
            status: status.as_u16(),
        })
    } else {
        Some(RtuApiError::ApiError {
            status: status.as_u16(),
            body: String::new(),
        })
    }
}

fn ensure_ok<T>(envelope: &RtuEnvelope<T>) -> Result<(), RtuApiError> {
    if envelope.is_ok() {
        Ok(())
    } else {
        Err(RtuApiError::Status(envelope.status.clone()))
    }
}

/// Each listed record is read on its own so one malformed entry cannot
/// discard the others.
fn projects_from(envelope: RtuEnvelope<Vec<serde_json::Value>>) -> Result<Vec<RtuExternalProject>, RtuApiError> {
    ensure_ok(&envelope)?;
    Ok(envelope
        .result
        .unwrap_or_default()
        .into_iter()
        .map(RtuExternalProject::from_listing)
        .collect())
}

fn session_id_from(envelope: RtuEnvelope<SessionResult>) -> Result<String, RtuApiError> {
    ensure_ok(&envelope)?;
    envelope
        .result
        .and_then(|r| r.session_id)
        .filter(|id| !id.is_empty())
        .ok_or(RtuApiError::MissingSessionId)
}

//! HTTP client for the tailor API. The wizard only talks to the backend
//! through [`WizardApi`], so tests can swap in a scripted implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::Analysis;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from the API. `message` is the server's error message.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// A resume file picked by the user, held in memory until uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadReceipt {
    pub path: String,
    pub url: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[async_trait]
pub trait WizardApi: Send + Sync {
    async fn create_session(&self) -> Result<Uuid, ClientError>;

    /// Merges `updates` (a JSON object of session columns) into the session.
    async fn update_session(&self, session_id: Uuid, updates: Value) -> Result<(), ClientError>;

    async fn scrape_job(&self, url: &str, session_id: Uuid) -> Result<Value, ClientError>;

    async fn upload_resume(
        &self,
        file: &ResumeFile,
        session_id: Uuid,
    ) -> Result<UploadReceipt, ClientError>;

    async fn analyze(&self, session_id: Uuid) -> Result<Analysis, ClientError>;
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    session: SessionId,
}

#[derive(Debug, Deserialize)]
struct SessionId {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ScrapeEnvelope {
    data: Value,
    #[serde(default)]
    cached: bool,
    #[serde(default)]
    mock: bool,
}

#[derive(Debug, Deserialize)]
struct AnalyzeEnvelope {
    analysis: Analysis,
    #[serde(default)]
    mock: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`WizardApi`] over HTTP, rooted at the API's base URL (e.g. `http://localhost:8080`).
#[derive(Clone)]
pub struct HttpWizardApi {
    client: Client,
    base_url: String,
}

impl HttpWizardApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }
}

#[async_trait]
impl WizardApi for HttpWizardApi {
    async fn create_session(&self) -> Result<Uuid, ClientError> {
        let response = self.client.post(self.endpoint("session")).send().await?;
        let envelope: SessionEnvelope = decode(response).await?;
        debug!("Created session {}", envelope.session.id);
        Ok(envelope.session.id)
    }

    async fn update_session(&self, session_id: Uuid, updates: Value) -> Result<(), ClientError> {
        let Value::Object(mut body) = updates else {
            return Err(ClientError::InvalidRequest(
                "session updates must be a JSON object".to_string(),
            ));
        };
        body.insert("sessionId".to_string(), Value::String(session_id.to_string()));

        let response = self
            .client
            .patch(self.endpoint("session"))
            .json(&body)
            .send()
            .await?;
        let _: Map<String, Value> = decode(response).await?;
        Ok(())
    }

    async fn scrape_job(&self, url: &str, session_id: Uuid) -> Result<Value, ClientError> {
        let response = self
            .client
            .post(self.endpoint("scrape"))
            .json(&serde_json::json!({ "url": url, "sessionId": session_id }))
            .send()
            .await?;
        let envelope: ScrapeEnvelope = decode(response).await?;
        debug!(
            "Scraped {url} (cached: {}, fixture: {})",
            envelope.cached, envelope.mock
        );
        Ok(envelope.data)
    }

    async fn upload_resume(
        &self,
        file: &ResumeFile,
        session_id: Uuid,
    ) -> Result<UploadReceipt, ClientError> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("sessionId", session_id.to_string());

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    async fn analyze(&self, session_id: Uuid) -> Result<Analysis, ClientError> {
        let response = self
            .client
            .post(self.endpoint("analyze"))
            .json(&serde_json::json!({ "sessionId": session_id }))
            .send()
            .await?;
        let envelope: AnalyzeEnvelope = decode(response).await?;
        if envelope.mock {
            warn!("Analysis for session {session_id} came from fixture data");
        }
        Ok(envelope.analysis)
    }
}

/// Decodes a success body as `T`, or turns an error body into `ClientError::Api`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_api_error_body() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"URL is required"}}"#;
        assert_eq!(error_message(body), "URL is required");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let api = HttpWizardApi::new("http://localhost:8080/").unwrap();
        assert_eq!(api.endpoint("scrape"), "http://localhost:8080/api/scrape");
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let err = ClientError::Api {
            status: 400,
            message: "File too large. Maximum size is 10MB.".to_string(),
        };
        assert_eq!(err.to_string(), "File too large. Maximum size is 10MB.");
    }
}

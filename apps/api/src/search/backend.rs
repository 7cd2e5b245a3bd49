//! Client-side view of the job store, as consumed by the search coordinator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::job_match::JobMatch;
use crate::search::wire::{matches_from_value, PollReply, SubmitResponse, SubmitSearchRequest};

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Job store returned status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Malformed job store response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Message shown to the user: the job store's own wording when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

/// The three job store operations the coordinator needs.
#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn submit(
        &self,
        query: &str,
        filters: Option<&Value>,
    ) -> Result<SubmitResponse, BackendError>;

    async fn poll(&self, search_id: &str) -> Result<PollReply, BackendError>;

    async fn fetch_matches(&self, search_id: &str) -> Result<Vec<JobMatch>, BackendError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Talks to the jobpulse HTTP service.
#[derive(Clone)]
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
}

impl HttpSearchBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Pulls a human-readable message out of an error body. Both the submit envelope
/// (`{"error": "..."}`) and the service error envelope (`{"error": {"message": ...}}`) are read.
fn error_message(body: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return Some(envelope.error.message);
    }
    serde_json::from_str::<SubmitResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .filter(|m| !m.trim().is_empty())
}

async fn json_body(response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(response.json::<Value>().await?)
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn submit(
        &self,
        query: &str,
        filters: Option<&Value>,
    ) -> Result<SubmitResponse, BackendError> {
        let request = SubmitSearchRequest {
            query: query.to_string(),
            filters: filters.cloned(),
            user_id: None,
        };
        let response = self
            .client
            .post(self.url("/api/v1/searches"))
            .json(&request)
            .send()
            .await?;
        let body = json_body(response).await?;
        serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn poll(&self, search_id: &str) -> Result<PollReply, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/v1/searches/{search_id}")))
            .send()
            .await?;
        let body = json_body(response).await?;
        let reply = PollReply::from_value(search_id, body);
        debug!("Polled search {search_id}: {}", reply.status.as_str());
        Ok(reply)
    }

    async fn fetch_matches(&self, search_id: &str) -> Result<Vec<JobMatch>, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/v1/searches/{search_id}/matches")))
            .send()
            .await?;
        let body = json_body(response).await?;
        Ok(matches_from_value(search_id, body))
    }
}

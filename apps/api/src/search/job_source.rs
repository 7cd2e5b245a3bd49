//! Upstream job stores the service delegates searches to.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::job_match::RawMatch;

#[derive(Debug, Error)]
pub enum JobSourceError {
    #[error("Job source unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Job source returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),
}

/// How an upstream answered a search request.
#[derive(Debug)]
pub enum JobSourceOutcome {
    /// Postings came back in the reply; the search can be completed right away.
    Resolved(Vec<RawMatch>),
    /// Accepted; results will arrive through the webhook.
    Deferred,
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn start_search(
        &self,
        search_id: Uuid,
        query: &str,
        filters: &Value,
    ) -> Result<JobSourceOutcome, JobSourceError>;
}

/// Used when no upstream is configured: every search waits for the webhook.
pub struct WebhookOnlySource;

#[async_trait]
impl JobSource for WebhookOnlySource {
    async fn start_search(
        &self,
        search_id: Uuid,
        _query: &str,
        _filters: &Value,
    ) -> Result<JobSourceOutcome, JobSourceError> {
        debug!("No job source configured; search {search_id} waits for webhook delivery");
        Ok(JobSourceOutcome::Deferred)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamRequest<'a> {
    search_id: Uuid,
    query: &'a str,
    filters: &'a Value,
}

/// Posts searches to an HTTP job store.
#[derive(Clone)]
pub struct HttpJobSource {
    client: Client,
    url: String,
}

impl HttpJobSource {
    pub fn new(url: String) -> Result<Self, JobSourceError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            url,
        })
    }
}

/// Reads an upstream reply. `success: false` is a rejection; a `matches` array resolves the
/// search; anything else defers it.
fn interpret_reply(body: Value) -> Result<JobSourceOutcome, JobSourceError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Job source rejected the search")
            .to_string();
        return Err(JobSourceError::Rejected(message));
    }
    match body.get("matches") {
        Some(Value::Array(items)) => Ok(JobSourceOutcome::Resolved(
            items
                .iter()
                .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
                .collect(),
        )),
        _ => Ok(JobSourceOutcome::Deferred),
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn start_search(
        &self,
        search_id: Uuid,
        query: &str,
        filters: &Value,
    ) -> Result<JobSourceOutcome, JobSourceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&UpstreamRequest {
                search_id,
                query,
                filters,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(JobSourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // an empty 202 body is a valid deferral
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(JobSourceOutcome::Deferred);
        }
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        interpret_reply(body)
    }
}

//! JSON bodies exchanged between the coordinator, the job store facade, and the webhook.
//! Keys are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::job_match::{validate_values, JobMatch, RawMatch};
use crate::models::search::SearchStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

/// Job store reply to a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SearchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn accepted(search_id: Uuid, status: SearchStatus) -> Self {
        Self {
            success: true,
            search_id: Some(search_id.to_string()),
            status: Some(status),
            error: None,
        }
    }

    pub fn rejected(search_id: Option<Uuid>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            search_id: search_id.map(|id| id.to_string()),
            status: search_id.map(|_| SearchStatus::Failed),
            error: Some(error.into()),
        }
    }
}

/// Poll body as the service writes it. `matches` is only present once completed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub search_id: Uuid,
    pub status: SearchStatus,
    pub query: String,
    pub filters: Value,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<JobMatch>>,
}

/// Poll body as the coordinator reads it: nothing beyond `status` is trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReply {
    pub status: SearchStatus,
    /// `Some` when the body carried a match set (malformed rows already dropped).
    pub matches: Option<Vec<JobMatch>>,
}

impl PollReply {
    /// Missing or unknown `status` reads as pending. A `matches` field that is not an array
    /// reads as an empty set.
    pub fn from_value(search_id: &str, body: Value) -> Self {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .map(SearchStatus::parse)
            .unwrap_or(SearchStatus::Pending);
        let matches = body.get("matches").filter(|m| !m.is_null()).map(|m| match m {
            Value::Array(items) => validate_values(items.clone(), search_id),
            _ => Vec::new(),
        });
        Self { status, matches }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<JobMatch>,
}

/// Reads a `{matches: [...]}` body leniently.
pub fn matches_from_value(search_id: &str, body: Value) -> Vec<JobMatch> {
    match body.get("matches") {
        Some(Value::Array(items)) => validate_values(items.clone(), search_id),
        _ => Vec::new(),
    }
}

/// Inbound callback delivering results for a deferred search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub search_id: Uuid,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub matches: Vec<Value>,
}

impl WebhookPayload {
    pub fn raw_matches(&self) -> Vec<RawMatch> {
        self.matches
            .iter()
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub success: bool,
    pub search_id: Uuid,
    pub inserted: usize,
}

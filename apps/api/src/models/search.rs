use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job_match::JobMatch;

/// Server-side lifecycle of a search. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Pending,
    Completed,
    Failed,
}

impl SearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Pending => "pending",
            SearchStatus::Completed => "completed",
            SearchStatus::Failed => "failed",
        }
    }

    /// Unknown strings read as pending so a poller keeps waiting rather than guessing.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => SearchStatus::Completed,
            "failed" => SearchStatus::Failed,
            _ => SearchStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SearchRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub query: String,
    pub filters: Value,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SearchRow {
    pub fn status(&self) -> SearchStatus {
        SearchStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobMatchRow {
    pub id: Uuid,
    pub search_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub url: Option<String>,
    pub posted_date: Option<String>,
    pub description: Option<String>,
    pub keyword_score: f64,
    pub semantic_score: Option<f64>,
    pub composite_score: i32,
    pub gap_analysis: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<JobMatchRow> for JobMatch {
    fn from(row: JobMatchRow) -> Self {
        JobMatch {
            id: row.id.to_string(),
            search_id: row.search_id.to_string(),
            title: row.title,
            company: row.company,
            location: row.location,
            salary: row.salary,
            url: row.url,
            posted_date: row.posted_date,
            description: row.description,
            keyword_score: row.keyword_score,
            semantic_score: row.semantic_score,
            composite_score: row.composite_score.clamp(0, 100) as u32,
            gap_analysis: row.gap_analysis,
        }
    }
}

/// A candidate's uploaded profile document (CV). Only the extracted text is used here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileDocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub extracted_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_lenient() {
        assert_eq!(SearchStatus::parse("COMPLETED"), SearchStatus::Completed);
        assert_eq!(SearchStatus::parse(" failed "), SearchStatus::Failed);
        assert_eq!(SearchStatus::parse("pending"), SearchStatus::Pending);
        assert_eq!(SearchStatus::parse("queued"), SearchStatus::Pending);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SearchStatus::Pending.is_terminal());
        assert!(SearchStatus::Completed.is_terminal());
        assert!(SearchStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&SearchStatus::Completed).unwrap();
        assert_eq!(json, r#""completed""#);
    }
}

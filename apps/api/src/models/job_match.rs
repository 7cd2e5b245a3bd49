//! Job matches, and the boundary where loose upstream rows become strict ones.
//!
//! Every payload that carries postings (job source replies, webhooks, poll responses) goes
//! through `RawMatch::validate`. Rows with an empty title or company never get past it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::scoring::blend::blend;

/// A validated job posting attached to a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub id: String,
    pub search_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub url: Option<String>,
    pub posted_date: Option<String>,
    pub description: Option<String>,
    /// 0–100
    pub keyword_score: f64,
    /// 0–1, `None` until a re-ranking pass computes it
    pub semantic_score: Option<f64>,
    /// 0–100
    pub composite_score: u32,
    pub gap_analysis: Option<Value>,
}

/// A posting as it arrives from outside: every field optional, nothing trusted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMatch {
    pub id: Option<String>,
    #[serde(alias = "search_id")]
    pub search_id: Option<String>,
    #[serde(alias = "job_title")]
    pub title: Option<String>,
    #[serde(alias = "company_name", alias = "employer")]
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(alias = "link")]
    pub url: Option<String>,
    #[serde(alias = "posted_date")]
    pub posted_date: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "keyword_score", alias = "score")]
    pub keyword_score: Option<f64>,
    #[serde(alias = "semantic_score")]
    pub semantic_score: Option<f64>,
    #[serde(alias = "composite_score")]
    pub composite_score: Option<f64>,
    #[serde(alias = "gap_analysis")]
    pub gap_analysis: Option<Value>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawMatch {
    /// Converts to a strict `JobMatch`, or `None` if title or company is missing.
    ///
    /// A missing id gets a fresh UUID; a missing search id falls back to `search_id`.
    /// Scores are clamped; a missing composite is derived from the keyword score.
    pub fn validate(self, search_id: &str) -> Option<JobMatch> {
        let title = non_blank(self.title)?;
        let company = non_blank(self.company)?;

        let keyword_score = self
            .keyword_score
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);
        let semantic_score = self
            .semantic_score
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0));
        let composite_score = match self.composite_score.filter(|s| s.is_finite()) {
            Some(c) => c.round().clamp(0.0, 100.0) as u32,
            None => blend(keyword_score, 0.0, 0.0),
        };

        Some(JobMatch {
            id: non_blank(self.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            search_id: non_blank(self.search_id).unwrap_or_else(|| search_id.to_string()),
            title,
            company,
            location: non_blank(self.location).unwrap_or_default(),
            salary: non_blank(self.salary),
            url: non_blank(self.url),
            posted_date: non_blank(self.posted_date),
            description: non_blank(self.description),
            keyword_score,
            semantic_score,
            composite_score,
            gap_analysis: self.gap_analysis.filter(|v| !v.is_null()),
        })
    }
}

/// Validates a batch, silently dropping malformed rows.
pub fn validate_matches(raw: Vec<RawMatch>, search_id: &str) -> Vec<JobMatch> {
    let received = raw.len();
    let matches: Vec<JobMatch> = raw
        .into_iter()
        .filter_map(|m| m.validate(search_id))
        .collect();
    if matches.len() < received {
        warn!(
            "Dropped {} malformed match(es) for search {search_id}",
            received - matches.len()
        );
    }
    matches
}

/// Lenient variant for untyped JSON: non-object elements count as malformed.
pub fn validate_values(raw: Vec<Value>, search_id: &str) -> Vec<JobMatch> {
    let parsed = raw
        .into_iter()
        .map(|v| serde_json::from_value::<RawMatch>(v).unwrap_or_default())
        .collect();
    validate_matches(parsed, search_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(title: &str, company: &str) -> RawMatch {
        RawMatch {
            title: Some(title.to_string()),
            company: Some(company.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_title_or_company_is_dropped() {
        let batch = vec![raw("Engineer", "Acme"), raw("", "Acme"), raw("Engineer", "   ")];
        let matches = validate_matches(batch, "s1");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].company, "Acme");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let m = raw(" Senior Developer ", "Acme").validate("s1").unwrap();
        assert_eq!(m.title, "Senior Developer");
        assert_eq!(m.search_id, "s1");
        assert_eq!(m.location, "");
        assert_eq!(m.keyword_score, 0.0);
        assert_eq!(m.composite_score, 0);
        assert!(m.semantic_score.is_none());
        assert!(Uuid::parse_str(&m.id).is_ok());
    }

    #[test]
    fn test_scores_are_clamped_and_composite_derived() {
        let mut r = raw("Engineer", "Acme");
        r.keyword_score = Some(104.2);
        r.semantic_score = Some(1.3);
        let m = r.validate("s1").unwrap();
        assert_eq!(m.keyword_score, 100.0);
        assert_eq!(m.semantic_score, Some(1.0));
        assert_eq!(m.composite_score, 100);
    }

    #[test]
    fn test_camel_and_snake_case_payloads_parse() {
        let camel: RawMatch = serde_json::from_value(json!({
            "title": "Dev", "company": "A", "keywordScore": 70.0, "postedDate": "2024-05-01"
        }))
        .unwrap();
        let snake: RawMatch = serde_json::from_value(json!({
            "job_title": "Dev", "company_name": "A", "keyword_score": 70.0, "posted_date": "2024-05-01"
        }))
        .unwrap();
        for r in [camel, snake] {
            let m = r.validate("s1").unwrap();
            assert_eq!(m.keyword_score, 70.0);
            assert_eq!(m.composite_score, 70);
            assert_eq!(m.posted_date.as_deref(), Some("2024-05-01"));
        }
    }

    #[test]
    fn test_untyped_values_tolerate_garbage() {
        let values = vec![
            json!({"title": "Dev", "company": "A"}),
            json!("not an object"),
            json!({"title": 42, "company": "B"}),
            json!(null),
        ];
        let matches = validate_values(values, "s1");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "Dev");
    }
}

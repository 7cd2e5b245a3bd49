//! Turns upstream postings into the match rows stored for a search.

use crate::models::job_match::{validate_matches, JobMatch, RawMatch};
use crate::scoring::similarity::lexical_overlap;

/// Keyword score for a posting the job store did not rank: share of query terms found in
/// its title and description, scaled to 0–100.
pub fn default_keyword_score(query: &str, raw: &RawMatch) -> f64 {
    let text = format!(
        "{} {}",
        raw.title.as_deref().unwrap_or_default(),
        raw.description.as_deref().unwrap_or_default()
    );
    (lexical_overlap(query, &text) * 100.0).round()
}

/// Validates a batch and derives keyword-only composites.
///
/// Any semantic or composite score supplied upstream is discarded; those belong to the
/// re-ranking pass.
pub fn prepare_matches(raw: Vec<RawMatch>, search_id: &str, query: &str) -> Vec<JobMatch> {
    let ranked = raw
        .into_iter()
        .map(|mut m| {
            if m.keyword_score.filter(|s| s.is_finite()).is_none() {
                m.keyword_score = Some(default_keyword_score(query, &m));
            }
            m.semantic_score = None;
            m.composite_score = None;
            m.search_id = None;
            m
        })
        .collect();
    validate_matches(ranked, search_id)
}

//! Re-ranking: recomputes semantic and composite scores for one search's matches.
//!
//! Flow: candidate vector (latest profile document) → per-match similarity → blend.
//! With no profile document the batch keeps its keyword scores. When the document exists
//! but cannot be embedded the pass degrades to lexical overlap against the query and
//! tags its result `fallback`. Embedding failures are never surfaced as errors.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::embedding_client::EmbeddingProvider;
use crate::models::job_match::JobMatch;
use crate::models::search::ProfileDocumentRow;
use crate::scoring::blend::blend;
use crate::scoring::similarity::{cosine_similarity, lexical_overlap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMethod {
    Embedding,
    Fallback,
    /// Nothing to rank with; no scores changed.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub match_id: String,
    /// 0–1
    pub semantic_score: f64,
    /// 0–100
    pub composite_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RerankOutcome {
    pub method: RankingMethod,
    pub updates: Vec<ScoreUpdate>,
}

impl RerankOutcome {
    fn unchanged() -> Self {
        Self {
            method: RankingMethod::None,
            updates: vec![],
        }
    }

    pub fn updated(&self) -> usize {
        self.updates.len()
    }
}

pub struct RerankRequest<'a> {
    pub user_id: Uuid,
    /// Most recent profile document, if the user has one.
    pub profile: Option<&'a ProfileDocumentRow>,
    pub query: &'a str,
    pub matches: &'a [JobMatch],
    pub semantic_weight: f64,
}

/// Computes new scores for a batch. Persisting them is the caller's job.
pub async fn rerank_matches(
    embedder: &dyn EmbeddingProvider,
    request: RerankRequest<'_>,
) -> RerankOutcome {
    if request.matches.is_empty() {
        return RerankOutcome::unchanged();
    }

    if request.profile.is_none() {
        info!(
            "No profile document for user {}; leaving keyword scores",
            request.user_id
        );
        return RerankOutcome::unchanged();
    }

    if let Some(candidate) = candidate_vector(embedder, &request).await {
        return rank_by_embedding(embedder, &candidate, &request).await;
    }

    if request.query.trim().is_empty() {
        info!(
            "No embedding and no query text for user {}; leaving keyword scores",
            request.user_id
        );
        return RerankOutcome::unchanged();
    }

    rank_by_overlap(&request)
}

async fn candidate_vector(
    embedder: &dyn EmbeddingProvider,
    request: &RerankRequest<'_>,
) -> Option<Vec<f32>> {
    let document = request.profile?;
    match embedder.embed_document(request.user_id, document).await {
        Ok(Some(vector)) => Some(vector),
        Ok(None) => {
            debug!("Embedding unavailable for document {}", document.id);
            None
        }
        Err(e) => {
            warn!("Embedding document {} failed, using fallback ranking: {e}", document.id);
            None
        }
    }
}

async fn rank_by_embedding(
    embedder: &dyn EmbeddingProvider,
    candidate: &[f32],
    request: &RerankRequest<'_>,
) -> RerankOutcome {
    let mut updates = Vec::with_capacity(request.matches.len());

    for job in request.matches {
        let Some(text) = job.description.as_deref() else {
            continue;
        };
        let vector = match embedder.embed_text(text).await {
            Ok(Some(v)) => v,
            Ok(None) => continue,
            Err(e) => {
                warn!("Embedding match {} failed, keeping its scores: {e}", job.id);
                continue;
            }
        };
        updates.push(score_update(job, cosine_similarity(candidate, &vector), request.semantic_weight));
    }

    info!(
        "Re-ranked {}/{} matches by embedding for user {}",
        updates.len(),
        request.matches.len(),
        request.user_id
    );
    RerankOutcome {
        method: RankingMethod::Embedding,
        updates,
    }
}

fn rank_by_overlap(request: &RerankRequest<'_>) -> RerankOutcome {
    let updates: Vec<ScoreUpdate> = request
        .matches
        .iter()
        .map(|job| {
            let text = match job.description.as_deref() {
                Some(description) => format!("{} {}", job.title, description),
                None => job.title.clone(),
            };
            score_update(job, lexical_overlap(request.query, &text), request.semantic_weight)
        })
        .collect();

    info!(
        "Re-ranked {} matches by lexical fallback for user {}",
        updates.len(),
        request.user_id
    );
    RerankOutcome {
        method: RankingMethod::Fallback,
        updates,
    }
}

fn score_update(job: &JobMatch, similarity: f64, weight: f64) -> ScoreUpdate {
    let semantic_score = similarity.clamp(0.0, 1.0);
    ScoreUpdate {
        match_id: job.id.clone(),
        semantic_score,
        composite_score: blend(job.keyword_score, semantic_score * 100.0, weight),
    }
}

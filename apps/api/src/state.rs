use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::embedding_client::EmbeddingProvider;
use crate::search::job_source::JobSource;
use crate::skills::{SkillTaxonomy, SkillVocabulary};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Upstream that produces postings. `WebhookOnlySource` when JOB_SOURCE_URL is unset.
    pub job_source: Arc<dyn JobSource>,
    /// `DisabledEmbeddings` when EMBEDDING_API_URL is unset, which forces fallback ranking.
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub taxonomy: Arc<SkillTaxonomy>,
    /// Phrase table for description scanning, built once from the taxonomy.
    pub vocabulary: Arc<SkillVocabulary>,
}

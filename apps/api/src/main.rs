use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobpulse::config::Config;
use jobpulse::db::create_pool;
use jobpulse::embedding_client::{DisabledEmbeddings, EmbeddingProvider, HttpEmbeddingClient};
use jobpulse::routes::build_router;
use jobpulse::search::job_source::{HttpJobSource, JobSource, WebhookOnlySource};
use jobpulse::skills::{SkillTaxonomy, SkillVocabulary};
use jobpulse::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobPulse API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;

    // Skill taxonomy and description-scan vocabulary, loaded once
    let taxonomy = SkillTaxonomy::from_config(config.skill_taxonomy_path.as_deref())?;
    let vocabulary = SkillVocabulary::new(&taxonomy);
    info!(
        "Skill taxonomy loaded: {} categories",
        taxonomy.category_names().count()
    );

    let job_source: Arc<dyn JobSource> = match &config.job_source_url {
        Some(url) => {
            info!("Job source: {url}");
            Arc::new(HttpJobSource::new(url.clone())?)
        }
        None => {
            warn!("JOB_SOURCE_URL not set; searches complete only via webhook delivery");
            Arc::new(WebhookOnlySource)
        }
    };

    let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding_api_url {
        Some(url) => {
            info!("Embedding provider: {url} (model: {})", config.embedding_model);
            Arc::new(HttpEmbeddingClient::new(
                url.clone(),
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
            )?)
        }
        None => {
            warn!("EMBEDDING_API_URL not set; re-ranking uses lexical fallback");
            Arc::new(DisabledEmbeddings)
        }
    };

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        job_source,
        embedder,
        taxonomy: Arc::new(taxonomy),
        vocabulary: Arc::new(vocabulary),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

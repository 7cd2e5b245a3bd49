pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insights;
use crate::search::handlers;
use crate::skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job store facade and the persistence reads the coordinator polls
        .route("/api/v1/searches", post(handlers::handle_submit))
        .route("/api/v1/searches/:id", get(handlers::handle_poll))
        .route("/api/v1/searches/:id/matches", get(handlers::handle_matches))
        .route("/api/v1/searches/:id/rerank", post(handlers::handle_rerank))
        // Read path
        .route(
            "/api/v1/searches/:id/insights",
            post(insights::handlers::handle_insights),
        )
        .route(
            "/api/v1/skills/compare",
            post(skills::handlers::handle_compare),
        )
        .route(
            "/api/v1/webhooks/search-results",
            post(handlers::handle_webhook),
        )
        .with_state(state)
}

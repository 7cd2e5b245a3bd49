use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::aggregate::{aggregate, DemandReport};
use crate::search::handlers::load_search;
use crate::search::store;
use crate::skills::extract::job_skills;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    #[serde(default)]
    pub candidate_skills: Vec<String>,
}

/// Demand report over every stored match of one search.
pub(crate) async fn demand_for_search(
    state: &AppState,
    search_id: Uuid,
    candidate_skills: &[String],
) -> Result<DemandReport, AppError> {
    load_search(state, search_id).await?;
    let matches = store::list_matches(&state.db, search_id).await?;
    Ok(aggregate(
        &matches,
        candidate_skills,
        &state.taxonomy,
        |job| job_skills(job, &state.vocabulary),
    ))
}

/// POST /api/v1/searches/:id/insights
pub async fn handle_insights(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
    Json(req): Json<InsightsRequest>,
) -> Result<Json<DemandReport>, AppError> {
    let report = demand_for_search(&state, search_id, &req.candidate_skills).await?;
    Ok(Json(report))
}

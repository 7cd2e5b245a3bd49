use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::handlers::demand_for_search;
use crate::models::job_match::JobMatch;
use crate::search::store;
use crate::skills::compare::{compare, SkillComparison};
use crate::skills::extract::{job_skills, SkillVocabulary};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    #[serde(default)]
    pub candidate_skills: Vec<String>,
    pub job_skills: Option<Vec<String>>,
    pub match_id: Option<Uuid>,
}

/// Explicit `jobSkills` win; otherwise the skills are extracted from the referenced match.
fn resolve_job_skills(
    explicit: Option<Vec<String>>,
    job: Option<&JobMatch>,
    vocabulary: &SkillVocabulary,
) -> Result<Vec<String>, AppError> {
    match (explicit, job) {
        (Some(skills), _) => Ok(skills),
        (None, Some(job)) => Ok(job_skills(job, vocabulary)),
        (None, None) => Err(AppError::Validation(
            "Either jobSkills or matchId is required".to_string(),
        )),
    }
}

/// POST /api/v1/skills/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<SkillComparison>, AppError> {
    let job = match req.match_id {
        Some(id) => Some(
            store::get_match(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))?,
        ),
        None => None,
    };

    let required = resolve_job_skills(req.job_skills, job.as_ref(), &state.vocabulary)?;
    let mut comparison = compare(&req.candidate_skills, &required);

    if let Some(job) = job {
        let search_id = Uuid::parse_str(&job.search_id)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored search id is not a UUID: {e}")))?;
        let report = demand_for_search(&state, search_id, &req.candidate_skills).await?;
        comparison.order_by_demand(&report.stats);
    }

    Ok(Json(comparison))
}

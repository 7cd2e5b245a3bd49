use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::search::{SearchRow, SearchStatus};
use crate::scoring::rerank::{rerank_matches, RankingMethod, RerankRequest};
use crate::search::ingest::prepare_matches;
use crate::search::job_source::JobSourceOutcome;
use crate::search::store;
use crate::search::wire::{
    MatchesResponse, PollResponse, SubmitResponse, SubmitSearchRequest, WebhookAck,
    WebhookPayload,
};
use crate::state::AppState;

pub(crate) async fn load_search(state: &AppState, search_id: Uuid) -> Result<SearchRow, AppError> {
    store::get_search(&state.db, search_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Search {search_id} not found")))
}

/// Reply for a submission whose job source call failed. `settled` is the stored status when the
/// search had already left `pending`, in which case that outcome stands.
fn source_failure_reply(
    search_id: Uuid,
    settled: Option<SearchStatus>,
    message: String,
) -> (StatusCode, SubmitResponse) {
    match settled {
        Some(status) => (StatusCode::OK, SubmitResponse::accepted(search_id, status)),
        None => (
            StatusCode::BAD_GATEWAY,
            SubmitResponse::rejected(Some(search_id), message),
        ),
    }
}

/// Non-object filters are wrapped so the column always holds an object.
fn normalize_filters(filters: Option<Value>) -> Value {
    match filters {
        None | Some(Value::Null) => json!({}),
        Some(Value::Object(map)) => Value::Object(map),
        Some(other) => json!({ "value": other }),
    }
}

/// POST /api/v1/searches
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitSearchRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(SubmitResponse::rejected(None, "Search query cannot be empty")),
        ));
    }
    let filters = normalize_filters(req.filters);

    let search = store::create_search(&state.db, req.user_id, query, &filters).await?;
    info!("Created search {} for '{query}'", search.id);

    match state.job_source.start_search(search.id, query, &filters).await {
        Ok(JobSourceOutcome::Resolved(raw)) => {
            let matches = prepare_matches(raw, &search.id.to_string(), query);
            let status = if store::complete_search(&state.db, search.id, req.user_id, &matches).await? {
                SearchStatus::Completed
            } else {
                // settled concurrently by the webhook
                load_search(&state, search.id).await?.status()
            };
            Ok((StatusCode::OK, Json(SubmitResponse::accepted(search.id, status))))
        }
        Ok(JobSourceOutcome::Deferred) => Ok((
            StatusCode::ACCEPTED,
            Json(SubmitResponse::accepted(search.id, SearchStatus::Pending)),
        )),
        Err(e) => {
            warn!("Job source failed for search {}: {e}", search.id);
            let message = e.to_string();
            let settled = if store::fail_search(&state.db, search.id, &message).await? {
                None
            } else {
                // the webhook delivered before the job source errored
                Some(load_search(&state, search.id).await?.status())
            };
            let (code, body) = source_failure_reply(search.id, settled, message);
            Ok((code, Json(body)))
        }
    }
}

/// GET /api/v1/searches/:id
pub async fn handle_poll(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
) -> Result<Json<PollResponse>, AppError> {
    let search = load_search(&state, search_id).await?;
    let status = search.status();
    let matches = match status {
        SearchStatus::Completed => Some(store::list_matches(&state.db, search_id).await?),
        _ => None,
    };
    Ok(Json(PollResponse {
        search_id,
        status,
        query: search.query,
        filters: search.filters,
        created_at: search.created_at,
        error: search.error_message,
        matches,
    }))
}

/// GET /api/v1/searches/:id/matches
pub async fn handle_matches(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
) -> Result<Json<MatchesResponse>, AppError> {
    load_search(&state, search_id).await?;
    let matches = store::list_matches(&state.db, search_id).await?;
    Ok(Json(MatchesResponse { matches }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankBody {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct RerankResponse {
    pub updated: u64,
    pub method: RankingMethod,
}

/// POST /api/v1/searches/:id/rerank
pub async fn handle_rerank(
    State(state): State<AppState>,
    Path(search_id): Path<Uuid>,
    Json(body): Json<RerankBody>,
) -> Result<Json<RerankResponse>, AppError> {
    let search = load_search(&state, search_id).await?;
    let matches = store::list_matches(&state.db, search_id).await?;
    let profile = store::latest_profile_document(&state.db, body.user_id).await?;

    let outcome = rerank_matches(
        state.embedder.as_ref(),
        RerankRequest {
            user_id: body.user_id,
            profile: profile.as_ref(),
            query: &search.query,
            matches: &matches,
            semantic_weight: state.config.semantic_weight,
        },
    )
    .await;

    let updated = if outcome.updates.is_empty() {
        0
    } else {
        store::apply_score_updates(&state.db, search_id, &outcome.updates).await?
    };
    Ok(Json(RerankResponse {
        updated,
        method: outcome.method,
    }))
}

/// POST /api/v1/webhooks/search-results
pub async fn handle_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<WebhookAck>, AppError> {
    let search = load_search(&state, payload.search_id).await?;
    if search.status().is_terminal() {
        return Err(AppError::Conflict(format!(
            "Search {} is already {}",
            search.id,
            search.status
        )));
    }

    let matches = prepare_matches(
        payload.raw_matches(),
        &search.id.to_string(),
        &search.query,
    );
    if !store::complete_search(&state.db, search.id, payload.user_id, &matches).await? {
        return Err(AppError::Conflict(format!(
            "Search {} settled before delivery",
            search.id
        )));
    }

    info!(
        "Webhook delivered {} of {} match(es) for search {}",
        matches.len(),
        payload.matches.len(),
        search.id
    );
    Ok(Json(WebhookAck {
        success: true,
        search_id: search.id,
        inserted: matches.len(),
    }))
}

//! Postgres access for searches, their matches, and profile documents.
//!
//! Status transitions only ever move a row out of `pending`; a terminal search is never
//! written again.

use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::job_match::JobMatch;
use crate::models::search::{JobMatchRow, ProfileDocumentRow, SearchRow};
use crate::scoring::rerank::ScoreUpdate;

pub async fn create_search(
    pool: &PgPool,
    user_id: Option<Uuid>,
    query: &str,
    filters: &Value,
) -> Result<SearchRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO searches (id, user_id, query, filters, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(query)
    .bind(filters)
    .fetch_one(pool)
    .await
}

pub async fn get_search(pool: &PgPool, search_id: Uuid) -> Result<Option<SearchRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM searches WHERE id = $1")
        .bind(search_id)
        .fetch_optional(pool)
        .await
}

/// Stores the batch and marks the search completed in one transaction.
///
/// Returns `false` without writing anything if the search was no longer pending.
pub async fn complete_search(
    pool: &PgPool,
    search_id: Uuid,
    user_id: Option<Uuid>,
    matches: &[JobMatch],
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let flipped: Option<Uuid> = sqlx::query_scalar(
        r#"
        UPDATE searches
        SET status = 'completed', completed_at = NOW(), user_id = COALESCE(user_id, $2)
        WHERE id = $1 AND status = 'pending'
        RETURNING id
        "#,
    )
    .bind(search_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if flipped.is_none() {
        tx.rollback().await?;
        return Ok(false);
    }

    for m in matches {
        sqlx::query(
            r#"
            INSERT INTO job_matches
                (id, search_id, title, company, location, salary, url, posted_date,
                 description, keyword_score, semantic_score, composite_score, gap_analysis)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        // upstream ids are not unique across searches
        .bind(Uuid::new_v4())
        .bind(search_id)
        .bind(&m.title)
        .bind(&m.company)
        .bind(&m.location)
        .bind(&m.salary)
        .bind(&m.url)
        .bind(&m.posted_date)
        .bind(&m.description)
        .bind(m.keyword_score)
        .bind(m.semantic_score)
        .bind(m.composite_score as i32)
        .bind(&m.gap_analysis)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!("Search {search_id} completed with {} match(es)", matches.len());
    Ok(true)
}

/// Marks a pending search failed. Returns `false` if it had already settled.
pub async fn fail_search(pool: &PgPool, search_id: Uuid, message: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE searches
        SET status = 'failed', error_message = $2, completed_at = NOW()
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(search_id)
    .bind(message)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Matches for a search, best composite first.
pub async fn list_matches(pool: &PgPool, search_id: Uuid) -> Result<Vec<JobMatch>, sqlx::Error> {
    let rows: Vec<JobMatchRow> = sqlx::query_as(
        r#"
        SELECT * FROM job_matches
        WHERE search_id = $1
        ORDER BY composite_score DESC, created_at ASC
        "#,
    )
    .bind(search_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(JobMatch::from).collect())
}

pub async fn get_match(pool: &PgPool, match_id: Uuid) -> Result<Option<JobMatch>, sqlx::Error> {
    let row: Option<JobMatchRow> = sqlx::query_as("SELECT * FROM job_matches WHERE id = $1")
        .bind(match_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(JobMatch::from))
}

pub async fn latest_profile_document(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ProfileDocumentRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM profile_documents
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Writes re-ranked scores. Updates naming a match outside `search_id` are ignored.
pub async fn apply_score_updates(
    pool: &PgPool,
    search_id: Uuid,
    updates: &[ScoreUpdate],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut written = 0;
    for update in updates {
        let result = sqlx::query(
            r#"
            UPDATE job_matches
            SET semantic_score = $3, composite_score = $4
            WHERE id = $1::uuid AND search_id = $2
            "#,
        )
        .bind(&update.match_id)
        .bind(search_id)
        .bind(update.semantic_score)
        .bind(update.composite_score as i32)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}

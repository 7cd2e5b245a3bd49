/// Embedding client: the single point of entry for text-embedding calls.
///
/// Re-ranking consumes embeddings only through the `EmbeddingProvider` trait, so the
/// provider can be swapped (or disabled) without touching the ranking code.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::search::ProfileDocumentRow;

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
const MAX_RETRIES: u32 = 3;
/// Providers cap input length; descriptions beyond this are truncated.
const MAX_INPUT_CHARS: usize = 8000;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Provider returned no embedding")]
    EmptyEmbedding,
}

/// Source of fixed-length vectors for candidate documents and job text.
///
/// `Ok(None)` means "no vector available", a degraded mode rather than a failure.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_document(
        &self,
        user_id: Uuid,
        document: &ProfileDocumentRow,
    ) -> Result<Option<Vec<f32>>, EmbeddingError>;

    async fn embed_text(&self, text: &str) -> Result<Option<Vec<f32>>, EmbeddingError>;
}

/// Provider used when no embedding endpoint is configured. Always unavailable.
pub struct DisabledEmbeddings;

#[async_trait]
impl EmbeddingProvider for DisabledEmbeddings {
    async fn embed_document(
        &self,
        _user_id: Uuid,
        _document: &ProfileDocumentRow,
    ) -> Result<Option<Vec<f32>>, EmbeddingError> {
        Ok(None)
    }

    async fn embed_text(&self, _text: &str) -> Result<Option<Vec<f32>>, EmbeddingError> {
        Ok(None)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI-compatible `/embeddings` client with retry on 429 and 5xx.
#[derive(Clone)]
pub struct HttpEmbeddingClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(url: String, api_key: Option<String>, model: String) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            url,
            api_key,
            model,
        })
    }

    async fn request(&self, input: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, body);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: EmbeddingResponse = response.json().await?;
            let vector = parsed
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .filter(|v| !v.is_empty())
                .ok_or(EmbeddingError::EmptyEmbedding)?;

            debug!("Embedding call succeeded: dims={}", vector.len());
            return Ok(vector);
        }

        Err(last_error.unwrap_or(EmbeddingError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    async fn embed_document(
        &self,
        user_id: Uuid,
        document: &ProfileDocumentRow,
    ) -> Result<Option<Vec<f32>>, EmbeddingError> {
        let Some(text) = document.extracted_text.as_deref() else {
            debug!("Document {} for user {user_id} has no extracted text", document.id);
            return Ok(None);
        };
        self.embed_text(text).await
    }

    async fn embed_text(&self, text: &str) -> Result<Option<Vec<f32>>, EmbeddingError> {
        let text = truncate_input(text);
        if text.is_empty() {
            return Ok(None);
        }
        self.request(text).await.map(Some)
    }
}

/// Trims and cuts to `MAX_INPUT_CHARS` on a char boundary.
fn truncate_input(text: &str) -> &str {
    let text = text.trim();
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

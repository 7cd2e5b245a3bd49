use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::embedding_client::DEFAULT_MODEL;
use crate::scoring::DEFAULT_SEMANTIC_WEIGHT;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Upstream job store. Without it, searches wait for the webhook.
    pub job_source_url: Option<String>,
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub semantic_weight: f64,
    pub skill_taxonomy_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            job_source_url: optional_env("JOB_SOURCE_URL"),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            semantic_weight: parse_weight(optional_env("SEMANTIC_WEIGHT").as_deref())?,
            skill_taxonomy_path: optional_env("SKILL_TAXONOMY_PATH").map(PathBuf::from),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank both read as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_weight(raw: Option<&str>) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_SEMANTIC_WEIGHT);
    };
    let weight: f64 = raw
        .parse()
        .with_context(|| format!("SEMANTIC_WEIGHT must be a number, got '{raw}'"))?;
    if !(0.0..=1.0).contains(&weight) {
        bail!("SEMANTIC_WEIGHT must lie in [0, 1], got {weight}");
    }
    Ok(weight)
}

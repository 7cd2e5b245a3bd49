//! JobPulse: job-search lifecycle coordination, skill gap analysis, score blending and
//! demand insights.

pub mod config;
pub mod db;
pub mod embedding_client;
pub mod errors;
pub mod insights;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod search;
pub mod skills;
pub mod state;

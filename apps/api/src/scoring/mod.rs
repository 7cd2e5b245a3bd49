// Composite scoring: the keyword/semantic blender and the re-ranking pass that feeds it.

pub mod blend;
pub mod rerank;
pub mod similarity;

pub use blend::{blend, DEFAULT_SEMANTIC_WEIGHT};
pub use rerank::{rerank_matches, RankingMethod, RerankOutcome, RerankRequest, ScoreUpdate};

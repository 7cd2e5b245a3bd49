/// Platform-wide share of the semantic signal in the composite score.
/// Keyword relevance dominates; semantic similarity is the secondary signal.
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.30;

/// Fuses a keyword score and a semantic score (both 0–100) into one ranking number.
///
/// `round(keyword × (1 − weight) + semantic × weight)`, clamped to 0–100.
/// The weight itself is clamped to 0–1 and non-finite inputs read as 0.
pub fn blend(keyword_score: f64, semantic_score: f64, semantic_weight: f64) -> u32 {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let weight = finite(semantic_weight).clamp(0.0, 1.0);
    let composite = finite(keyword_score) * (1.0 - weight) + finite(semantic_score) * weight;
    composite.round().clamp(0.0, 100.0) as u32
}

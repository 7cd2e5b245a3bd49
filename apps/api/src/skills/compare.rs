//! Candidate-vs-job skill comparison with matched / partial / missing classification.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::insights::DemandStat;
use crate::skills::normalize::{normalize, variations_of, SkillToken, VariationSet};

/// How a required skill relates to a candidate's skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Matched,
    Partial,
    Missing,
}

/// Derived view of one candidate skill set against one job's requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillComparison {
    pub matched: Vec<String>,
    pub partial: Vec<String>,
    pub missing: Vec<String>,
    pub match_percentage: u32,
    pub total: usize,
}

impl SkillComparison {
    /// Stable-sorts each list by demand count, highest first. Skills without a stat go last.
    pub fn order_by_demand(&mut self, stats: &[DemandStat]) {
        let demand: HashMap<SkillToken, u32> = stats
            .iter()
            .map(|s| (normalize(&s.canonical_name), s.demand_count))
            .collect();
        let key = |skill: &String| {
            std::cmp::Reverse(demand.get(&normalize(skill)).copied().unwrap_or(0))
        };
        self.matched.sort_by_key(key);
        self.partial.sort_by_key(key);
        self.missing.sort_by_key(key);
    }
}

/// A candidate's skills, normalized once and reused across many classifications.
#[derive(Debug, Clone, Default)]
pub struct CandidateSkills {
    sets: Vec<VariationSet>,
}

impl CandidateSkills {
    pub fn new<S: AsRef<str>>(skills: &[S]) -> Self {
        let mut seen = HashSet::new();
        let sets = skills
            .iter()
            .map(|s| normalize(s.as_ref()))
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .map(variations_of)
            .collect();
        Self { sets }
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Exact variation overlap beats substring adjacency; anything else is missing.
    pub fn classify(&self, required: &VariationSet) -> SkillStatus {
        if self.sets.iter().any(|c| c.intersects(required)) {
            SkillStatus::Matched
        } else if self.sets.iter().any(|c| c.base().overlaps(required.base())) {
            SkillStatus::Partial
        } else {
            SkillStatus::Missing
        }
    }
}

/// Deduplicates raw skills by normalized form, keeping the first raw spelling.
/// Skills that normalize to nothing are dropped.
pub fn dedup_skills<S: AsRef<str>>(skills: &[S]) -> Vec<(String, SkillToken)> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            let token = normalize(raw);
            (!token.is_empty() && seen.insert(token.clone())).then(|| (raw.trim().to_string(), token))
        })
        .collect()
}

/// Half credit for partial matches, zero when there is nothing to cover.
pub fn weighted_percentage(matched: usize, partial: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (((matched as f64 + 0.5 * partial as f64) / total as f64) * 100.0).round() as u32
}

/// Compares a candidate's skills against a job's required skills.
///
/// Output lists keep the job skills' insertion order after deduplication.
pub fn compare<C: AsRef<str>, J: AsRef<str>>(
    candidate_skills: &[C],
    job_skills: &[J],
) -> SkillComparison {
    let candidate = CandidateSkills::new(candidate_skills);
    let required = dedup_skills(job_skills);

    let mut comparison = SkillComparison {
        total: required.len(),
        ..Default::default()
    };

    for (raw, token) in required {
        match candidate.classify(&variations_of(token)) {
            SkillStatus::Matched => comparison.matched.push(raw),
            SkillStatus::Partial => comparison.partial.push(raw),
            SkillStatus::Missing => comparison.missing.push(raw),
        }
    }

    comparison.match_percentage = weighted_percentage(
        comparison.matched.len(),
        comparison.partial.len(),
        comparison.total,
    );
    comparison
}

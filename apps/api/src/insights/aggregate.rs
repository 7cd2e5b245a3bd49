//! Demand aggregation: trending-skill statistics over a batch of matches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::job_match::JobMatch;
use crate::skills::compare::{dedup_skills, weighted_percentage, CandidateSkills, SkillStatus};
use crate::skills::normalize::{variations_of, SkillToken};
use crate::skills::taxonomy::SkillTaxonomy;

/// Demand for one distinct (normalized) skill across a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandStat {
    /// First raw spelling encountered.
    pub canonical_name: String,
    /// Number of distinct matches requiring the skill.
    pub demand_count: u32,
    pub demand_percent: u32,
    pub status: SkillStatus,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category: String,
    pub demand_count: u32,
    pub skills: Vec<DemandStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandSummary {
    pub total: usize,
    pub matched: usize,
    pub partial: usize,
    pub missing: usize,
    /// Half credit for partial matches, 0–100.
    pub coverage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandReport {
    pub stats: Vec<DemandStat>,
    /// Ordered by summed demand, highest first.
    pub by_category: Vec<CategoryGroup>,
    pub summary: DemandSummary,
}

/// Builds the full demand report. Recomputed from scratch on every call.
///
/// `job_skills` supplies each match's required skills; duplicates within one match count once.
pub fn aggregate<C, F>(
    matches: &[JobMatch],
    candidate_skills: &[C],
    taxonomy: &SkillTaxonomy,
    job_skills: F,
) -> DemandReport
where
    C: AsRef<str>,
    F: Fn(&JobMatch) -> Vec<String>,
{
    if matches.is_empty() {
        return DemandReport::default();
    }

    // token -> (first raw spelling, count); Vec keeps first-seen order
    let mut order: Vec<(SkillToken, String, u32)> = Vec::new();
    let mut index: HashMap<SkillToken, usize> = HashMap::new();

    for job in matches {
        for (raw, token) in dedup_skills(&job_skills(job)) {
            match index.get(&token) {
                Some(&i) => order[i].2 += 1,
                None => {
                    index.insert(token.clone(), order.len());
                    order.push((token, raw, 1));
                }
            }
        }
    }

    let candidate = CandidateSkills::new(candidate_skills);
    let total_matches = matches.len() as f64;

    let mut stats: Vec<DemandStat> = order
        .into_iter()
        .map(|(token, raw, count)| DemandStat {
            canonical_name: raw,
            demand_count: count,
            demand_percent: ((count as f64 / total_matches) * 100.0).round() as u32,
            status: candidate.classify(&variations_of(token.clone())),
            category: taxonomy.categorize(&token).to_string(),
        })
        .collect();
    // stable: ties keep first-seen order
    stats.sort_by(|a, b| b.demand_count.cmp(&a.demand_count));

    let summary = summarize(&stats);
    let by_category = group_by_category(&stats);

    DemandReport {
        stats,
        by_category,
        summary,
    }
}

fn summarize(stats: &[DemandStat]) -> DemandSummary {
    let count = |status: SkillStatus| stats.iter().filter(|s| s.status == status).count();
    let matched = count(SkillStatus::Matched);
    let partial = count(SkillStatus::Partial);
    DemandSummary {
        total: stats.len(),
        matched,
        partial,
        missing: count(SkillStatus::Missing),
        coverage: weighted_percentage(matched, partial, stats.len()),
    }
}

fn group_by_category(stats: &[DemandStat]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for stat in stats {
        match groups.iter_mut().find(|g| g.category == stat.category) {
            Some(group) => {
                group.demand_count += stat.demand_count;
                group.skills.push(stat.clone());
            }
            None => groups.push(CategoryGroup {
                category: stat.category.clone(),
                demand_count: stat.demand_count,
                skills: vec![stat.clone()],
            }),
        }
    }
    groups.sort_by(|a, b| b.demand_count.cmp(&a.demand_count));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::taxonomy::OTHER_CATEGORY;
    use serde_json::json;

    fn job(id: &str, skills: &[&str]) -> JobMatch {
        JobMatch {
            id: id.to_string(),
            search_id: "s1".to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: String::new(),
            salary: None,
            url: None,
            posted_date: None,
            description: None,
            keyword_score: 50.0,
            semantic_score: None,
            composite_score: 50,
            gap_analysis: Some(json!({ "requiredSkills": skills })),
        }
    }

    fn listed_skills(job: &JobMatch) -> Vec<String> {
        job.gap_analysis
            .as_ref()
            .and_then(crate::skills::extract::skills_from_gap_analysis)
            .unwrap_or_default()
    }

    fn run(matches: &[JobMatch], candidate: &[&str]) -> DemandReport {
        aggregate(matches, candidate, &SkillTaxonomy::default(), listed_skills)
    }

    #[test]
    fn test_empty_batch_is_empty_report() {
        let report = run(&[], &["Rust"]);
        assert!(report.stats.is_empty());
        assert!(report.by_category.is_empty());
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.coverage, 0);
    }

    #[test]
    fn test_counts_distinct_matches_per_skill() {
        let matches = vec![
            job("m1", &["Rust", "rust", "Docker"]),
            job("m2", &["Rust", "Kubernetes"]),
            job("m3", &["RUST"]),
            job("m4", &[]),
        ];
        let report = run(&matches, &["rust"]);

        assert_eq!(report.stats[0].canonical_name, "Rust");
        assert_eq!(report.stats[0].demand_count, 3);
        assert_eq!(report.stats[0].demand_percent, 75);
        assert_eq!(report.stats[0].status, SkillStatus::Matched);
        assert_eq!(report.stats.len(), 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let matches = vec![job("m1", &["Kafka", "Docker"]), job("m2", &["Docker", "Kafka"])];
        let report = run(&matches, &[] as &[&str]);
        let names: Vec<&str> = report.stats.iter().map(|s| s.canonical_name.as_str()).collect();
        assert_eq!(names, vec!["Kafka", "Docker"]);
    }

    #[test]
    fn test_status_and_summary_use_half_credit() {
        let matches = vec![job("m1", &["React", "PostgreSQL", "Go", "Terraform"])];
        let report = run(&matches, &["react", "sql"]);

        let status_of = |name: &str| {
            report
                .stats
                .iter()
                .find(|s| s.canonical_name == name)
                .map(|s| s.status)
        };
        assert_eq!(status_of("React"), Some(SkillStatus::Matched));
        assert_eq!(status_of("PostgreSQL"), Some(SkillStatus::Partial));
        assert_eq!(status_of("Terraform"), Some(SkillStatus::Missing));

        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.summary.partial, 1);
        assert_eq!(report.summary.missing, 2);
        // (1 + 0.5) / 4 = 37.5 -> 38
        assert_eq!(report.summary.coverage, 38);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = run(&[job("m1", &["Rust"])], &["Rust"]);
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(
            body["summary"],
            json!({"total": 1, "matched": 1, "partial": 0, "missing": 0, "coverage": 100})
        );
        assert_eq!(body["byCategory"][0]["demandCount"], 1);
        assert_eq!(body["stats"][0]["canonicalName"], "Rust");
        assert_eq!(body["stats"][0]["demandPercent"], 100);
    }

    #[test]
    fn test_categories_ordered_by_summed_demand() {
        let matches = vec![
            job("m1", &["React", "Vue", "PostgreSQL"]),
            job("m2", &["React", "Vue", "Underwater Welding"]),
            job("m3", &["Redis"]),
        ];
        let report = run(&matches, &[] as &[&str]);

        let order: Vec<&str> = report.by_category.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order, vec!["Frontend", "Databases", OTHER_CATEGORY]);
        assert_eq!(report.by_category[0].demand_count, 4);
        assert_eq!(report.by_category[1].demand_count, 2);
        assert_eq!(report.by_category[1].skills.len(), 2);
    }

    #[test]
    fn test_matches_without_skills_contribute_nothing() {
        let report = run(&[job("m1", &[])], &["rust"]);
        assert!(report.stats.is_empty());
        assert_eq!(report.summary.coverage, 0);
    }
}

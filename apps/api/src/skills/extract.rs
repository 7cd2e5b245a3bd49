//! Required-skill extraction for a single job match.
//!
//! Structured gap-analysis hints win when present; otherwise the description is scanned
//! for phrases from the known vocabulary (alias table plus taxonomy members).

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::models::job_match::JobMatch;
use crate::skills::normalize::{alias_spellings, normalize, SkillToken};
use crate::skills::taxonomy::SkillTaxonomy;

/// Longest vocabulary phrase, in words, matched by the description scan.
const MAX_PHRASE_WORDS: usize = 3;

/// Alias spellings that are also everyday English words; never matched in free text.
const AMBIGUOUS_WORDS: &[&str] = &["go", "rest", "express", "next", "spring", "node", "containers"];

const LIST_KEYS: &[&str] = &["requiredSkills", "required_skills", "skills"];
const STATUS_KEYS: &[&str] = &["matched", "partial", "missing"];

/// Known skill phrases keyed by normalized token, mapped to a display spelling.
#[derive(Debug, Clone, Default)]
pub struct SkillVocabulary {
    phrases: HashMap<SkillToken, String>,
}

impl SkillVocabulary {
    pub fn new(taxonomy: &SkillTaxonomy) -> Self {
        let mut phrases = HashMap::new();
        let mut learn = |spelling: &str| {
            let token = normalize(spelling);
            // very short tokens ("c", "r") collide with ordinary words
            if token.as_str().len() < 2 || AMBIGUOUS_WORDS.contains(&token.as_str()) {
                return;
            }
            phrases.entry(token).or_insert_with(|| spelling.to_string());
        };
        taxonomy.vocabulary().for_each(&mut learn);
        alias_spellings().for_each(&mut learn);
        Self { phrases }
    }

    /// Scans text for known skills, returning display spellings in first-seen order.
    pub fn scan(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')' | ':' | '|'))
            .map(|w| w.trim_end_matches(['.', '!', '?']))
            .filter(|w| !w.is_empty())
            .collect();

        let mut found: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for start in 0..words.len() {
            for len in (1..=MAX_PHRASE_WORDS).rev() {
                let Some(window) = words.get(start..start + len) else {
                    continue;
                };
                let token = normalize(&window.join(" "));
                if let Some(display) = self.phrases.get(&token) {
                    if seen.insert(token) {
                        found.push(display.clone());
                    }
                    break;
                }
            }
        }
        found
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                // {"skill": "Rust"} or {"name": "Rust"}
                Value::Object(o) => o
                    .get("skill")
                    .or_else(|| o.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect(),
    )
}

/// Skills listed in a match's structured gap-analysis data, if it carries any.
pub fn skills_from_gap_analysis(gap_analysis: &Value) -> Option<Vec<String>> {
    let object = gap_analysis.as_object()?;

    if let Some(list) = LIST_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(string_list))
    {
        return Some(list);
    }

    let mut union = Vec::new();
    let mut any = false;
    for key in STATUS_KEYS {
        if let Some(list) = object.get(*key).and_then(string_list) {
            any = true;
            union.extend(list);
        }
    }
    any.then_some(union)
}

/// The required skills of one match (not deduplicated).
pub fn job_skills(job: &JobMatch, vocabulary: &SkillVocabulary) -> Vec<String> {
    if let Some(skills) = job.gap_analysis.as_ref().and_then(skills_from_gap_analysis) {
        return skills;
    }
    match job.description.as_deref() {
        Some(description) => vocabulary.scan(description),
        None => vocabulary.scan(&job.title),
    }
}

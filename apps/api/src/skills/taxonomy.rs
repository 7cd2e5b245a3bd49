//! Skill category taxonomy.
//!
//! Immutable lookup data: loaded once at startup (built-in table, or a JSON override via
//! `SKILL_TAXONOMY_PATH`) and shared behind an `Arc` in `AppState`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::skills::normalize::{normalize, SkillToken};

pub const OTHER_CATEGORY: &str = "Other";

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Languages",
        &[
            "python", "javascript", "typescript", "java", "golang", "rust", "c++", "c#", "ruby",
            "php", "kotlin", "swift", "scala", "elixir", "haskell", "perl", "dart", "lua",
        ],
    ),
    (
        "Frontend",
        &[
            "react", "vue", "angular", "svelte", "next.js", "nuxt", "html", "css", "sass",
            "tailwind", "redux", "webpack", "vite", "jquery", "bootstrap",
        ],
    ),
    (
        "Backend",
        &[
            "node.js", "express", "nestjs", "django", "flask", "fastapi", "spring", "rails",
            "laravel", ".net", "graphql", "rest", "grpc", "microservices", "kafka", "rabbitmq",
        ],
    ),
    (
        "Databases",
        &[
            "postgresql", "mysql", "mongodb", "redis", "sqlite", "elasticsearch", "dynamodb",
            "cassandra", "oracle", "sql", "snowflake", "bigquery",
        ],
    ),
    (
        "DevOps & Cloud",
        &[
            "aws", "gcp", "azure", "docker", "kubernetes", "terraform", "ansible", "jenkins",
            "ci/cd", "github actions", "linux", "nginx", "helm", "prometheus", "grafana",
        ],
    ),
    (
        "Data & AI",
        &[
            "machine learning", "deep learning", "pytorch", "tensorflow", "scikit-learn",
            "pandas", "numpy", "spark", "airflow", "nlp", "computer vision",
            "large language models", "data analysis", "statistics", "tableau", "power bi",
        ],
    ),
    (
        "Mobile",
        &["ios", "android", "react native", "flutter", "xamarin", "swiftui", "jetpack compose"],
    ),
    (
        "Testing",
        &["jest", "cypress", "selenium", "playwright", "pytest", "junit", "unit testing", "tdd"],
    ),
    (
        "Soft Skills",
        &[
            "communication", "leadership", "teamwork", "mentoring", "problem solving",
            "stakeholder management", "agile", "scrum", "project management",
        ],
    ),
];

#[derive(Debug, Clone)]
struct Category {
    name: String,
    /// Raw member spellings, kept for vocabulary scans.
    members: Vec<String>,
    tokens: Vec<SkillToken>,
}

/// JSON shape of a taxonomy override file. An array keeps category order.
#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    categories: Vec<CategoryFile>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    name: String,
    skills: Vec<String>,
}

/// Category → member tokens. Order matters: the first category wins on ties.
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    categories: Vec<Category>,
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::from_pairs(
            BUILTIN
                .iter()
                .map(|(name, members)| (name.to_string(), members.iter().map(|m| m.to_string()).collect())),
        )
    }
}

impl SkillTaxonomy {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let categories = pairs
            .into_iter()
            .map(|(name, members)| {
                let tokens = members
                    .iter()
                    .map(|m| normalize(m))
                    .filter(|t| !t.is_empty())
                    .collect();
                Category {
                    name,
                    members,
                    tokens,
                }
            })
            .collect();
        Self { categories }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: TaxonomyFile =
            serde_json::from_str(json).context("Skill taxonomy is not valid JSON")?;
        Ok(Self::from_pairs(
            file.categories.into_iter().map(|c| (c.name, c.skills)),
        ))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill taxonomy at {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Built-in table unless a path is configured.
    pub fn from_config(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Every member spelling across categories.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.members.iter().map(String::as_str))
    }

    /// Exact token match across all categories first, then substring tolerance
    /// (equals, contains, or is contained by a member). Falls back to "Other".
    pub fn categorize(&self, token: &SkillToken) -> &str {
        if token.is_empty() {
            return OTHER_CATEGORY;
        }
        self.categories
            .iter()
            .find(|c| c.tokens.iter().any(|t| t == token))
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.tokens.iter().any(|t| t.overlaps(token)))
            })
            .map(|c| c.name.as_str())
            .unwrap_or(OTHER_CATEGORY)
    }
}

//! Skill normalization: raw skill strings to comparable tokens.
//!
//! Every comparison in the crate runs on `VariationSet`s built here, never on raw strings,
//! so casing, punctuation and common aliases ("Node.js" / "nodejs" / "node") collapse together.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Normalized form of a raw skill: lower-case, restricted to `[a-z0-9+#]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillToken(String);

impl SkillToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bidirectional substring containment, the "partial" relationship.
    /// Empty tokens never relate to anything.
    pub fn overlaps(&self, other: &SkillToken) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl fmt::Display for SkillToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All tokens considered equivalent to one raw skill. Always contains the base token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationSet {
    base: SkillToken,
    forms: BTreeSet<SkillToken>,
}

impl VariationSet {
    pub fn base(&self) -> &SkillToken {
        &self.base
    }

    pub fn contains(&self, token: &SkillToken) -> bool {
        self.forms.contains(token)
    }

    pub fn intersects(&self, other: &VariationSet) -> bool {
        // BTreeSet::is_disjoint walks the smaller set
        !self.forms.is_disjoint(&other.forms)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillToken> {
        self.forms.iter()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

/// Alias groups, written in raw form and normalized on first use.
/// Each group is a set of spellings for the same skill.
const ALIAS_GROUPS: &[&[&str]] = &[
    &["javascript", "js", "ecmascript", "es6"],
    &["typescript", "ts"],
    &["node.js", "nodejs", "node"],
    &["react", "react.js", "reactjs"],
    &["react native", "react-native"],
    &["vue", "vue.js", "vuejs"],
    &["angular", "angularjs", "angular.js"],
    &["next.js", "nextjs", "next"],
    &["nuxt", "nuxt.js", "nuxtjs"],
    &["express", "express.js", "expressjs"],
    &["nestjs", "nest.js"],
    &["tailwind", "tailwindcss", "tailwind css"],
    &["sass", "scss"],
    &["css", "css3"],
    &["html", "html5"],
    &["postgresql", "postgres", "psql"],
    &["mongodb", "mongo"],
    &["mysql", "mariadb"],
    &["elasticsearch", "elastic search"],
    &["dynamodb", "dynamo db"],
    &["golang", "go"],
    &["c#", "csharp", "c sharp"],
    &["c++", "cpp", "cplusplus"],
    &[".net", "dotnet", "asp.net", "aspnet"],
    &["python", "python3", "py"],
    &["java", "openjdk"],
    &["kotlin", "kotlin jvm"],
    &["rust", "rust lang", "rustlang"],
    &["kubernetes", "k8s", "kube"],
    &["docker", "docker compose", "containers"],
    &["aws", "amazon web services"],
    &["gcp", "google cloud", "google cloud platform"],
    &["azure", "microsoft azure"],
    &["ci/cd", "cicd", "continuous integration"],
    &["terraform", "tf"],
    &["machine learning", "ml"],
    &["artificial intelligence", "ai"],
    &["deep learning", "dl"],
    &["natural language processing", "nlp"],
    &["large language models", "llm", "llms"],
    &["pytorch", "torch"],
    &["tensorflow", "tf2"],
    &["scikit-learn", "sklearn", "scikit learn"],
    &["graphql", "gql"],
    &["rest", "rest api", "restful", "rest apis"],
    &["ruby on rails", "rails", "ror"],
    &["spring", "spring boot", "springboot"],
    &["ux", "user experience"],
    &["ui", "user interface"],
];

/// Normalized token → index of its alias group.
static ALIAS_INDEX: LazyLock<(Vec<Vec<SkillToken>>, HashMap<SkillToken, usize>)> =
    LazyLock::new(|| {
        let groups: Vec<Vec<SkillToken>> = ALIAS_GROUPS
            .iter()
            .map(|group| {
                let mut tokens: Vec<SkillToken> = group.iter().map(|s| normalize(s)).collect();
                tokens.dedup();
                tokens
            })
            .collect();

        let mut index = HashMap::new();
        for (i, group) in groups.iter().enumerate() {
            for token in group {
                // first group wins if a spelling is listed twice
                index.entry(token.clone()).or_insert(i);
            }
        }
        (groups, index)
    });

/// Lower-case, drop everything outside `[a-z0-9+#]`, trim.
pub fn normalize(skill: &str) -> SkillToken {
    let token: String = skill
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '+' || *c == '#')
        .collect();
    SkillToken(token.trim().to_string())
}

/// The normalized form plus every known alias of it.
pub fn variations(skill: &str) -> VariationSet {
    variations_of(normalize(skill))
}

pub(crate) fn variations_of(base: SkillToken) -> VariationSet {
    let mut forms = BTreeSet::new();
    let (groups, index) = &*ALIAS_INDEX;
    if let Some(&i) = index.get(&base) {
        forms.extend(groups[i].iter().cloned());
    }
    forms.insert(base.clone());
    VariationSet { base, forms }
}

/// Every raw alias spelling known to the alias table, for vocabulary scans.
pub(crate) fn alias_spellings() -> impl Iterator<Item = &'static str> {
    ALIAS_GROUPS.iter().flat_map(|group| group.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Node.js").as_str(), "nodejs");
        assert_eq!(normalize("  React  ").as_str(), "react");
        assert_eq!(normalize("C++").as_str(), "c++");
        assert_eq!(normalize("C#").as_str(), "c#");
        assert_eq!(normalize("CI/CD").as_str(), "cicd");
        assert_eq!(normalize("Machine Learning").as_str(), "machinelearning");
    }

    #[test]
    fn test_normalize_drops_non_ascii() {
        assert_eq!(normalize("Développeur").as_str(), "dveloppeur");
        assert!(normalize("—").is_empty());
    }

    #[test]
    fn test_variations_always_include_base() {
        let set = variations("SomethingUnknown");
        assert_eq!(set.len(), 1);
        assert!(set.contains(&normalize("somethingunknown")));
    }

    #[test]
    fn test_variations_expand_aliases() {
        let set = variations("Node.js");
        assert!(set.contains(&normalize("node")));
        assert!(set.contains(&normalize("nodejs")));
        assert_eq!(set.base().as_str(), "nodejs");
    }

    #[test]
    fn test_alias_sets_intersect_across_spellings() {
        assert!(variations("k8s").intersects(&variations("Kubernetes")));
        assert!(variations("Postgres").intersects(&variations("PostgreSQL")));
        assert!(!variations("Java").intersects(&variations("JavaScript")));
    }

    #[test]
    fn test_overlaps_is_bidirectional_and_ignores_empty() {
        let css = normalize("css");
        let c = normalize("c");
        assert!(c.overlaps(&css));
        assert!(css.overlaps(&c));
        assert!(!normalize("").overlaps(&css));
    }
}

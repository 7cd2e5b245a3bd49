// Skill normalization, fuzzy comparison, category taxonomy and per-match extraction.
// Everything here is pure and synchronous; callers share one taxonomy/vocabulary via AppState.

pub mod compare;
pub mod extract;
pub mod handlers;
pub mod normalize;
pub mod taxonomy;

pub use compare::{compare, CandidateSkills, SkillComparison, SkillStatus};
pub use extract::{job_skills, SkillVocabulary};
pub use normalize::{normalize, variations, SkillToken, VariationSet};
pub use taxonomy::SkillTaxonomy;

pub mod job_match;
pub mod search;

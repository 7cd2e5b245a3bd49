pub mod aggregate;
pub mod handlers;

pub use aggregate::{aggregate, CategoryGroup, DemandReport, DemandStat, DemandSummary};

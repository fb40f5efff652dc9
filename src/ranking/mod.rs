//! Exhaustive ranking of every three-line combination a slot can roll.

pub mod cache;
pub mod job;
pub mod types;

pub use cache::{RankingCache, RankingClaim};
pub use job::{finalize_entries, rank_of, RankingJob, RankingOutcome};
pub use types::*;

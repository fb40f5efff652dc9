//! Stat bundles, class context, and the reward-to-value pipeline.

pub mod mapper;
pub mod types;
pub mod value;

pub use mapper::{apply_lines, compound_primary_pct, map_to_stat_delta, StatDelta};
pub use types::*;
pub use value::*;

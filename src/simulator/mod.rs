//! Budget simulator for comparing allocation policies.
//!
//! Runs many independent trials per policy, each spending a fixed number of
//! attempts on its own copy of the slots, and reports how the final value
//! gain is distributed:
//! - Mean, min, max and quartiles per policy
//! - A histogram on a range shared by all policies
//! - The end state of each policy's best trial

mod config;
mod policy;
mod report;
mod runner;

pub use config::SimConfig;
pub use policy::{rarity_score, Policy};
pub use report::{Histogram, PolicySummary, StrategyReport};
pub use runner::{compare_strategies, run_strategy, TrialContext, TrialResult};

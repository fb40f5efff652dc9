//! Cube Optimizer - upgrade planning for tiered, pity-backed reward rolls
//!
//! Ranks every line combination a slot can roll, estimates the value of
//! one more attempt on each slot, and compares allocation policies over
//! many simulated budgets.

pub mod catalogue;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod game_data;
pub mod ranking;
pub mod simulator;
pub mod slots;
pub mod stats;
pub mod tiers;
pub mod utils;

pub use engine::{Advice, Engine, PendingRanking};
pub use error::{GuidanceError, LoadError};
pub use game_data::GameData;

//! Quality tiers and the pity-backed transition model between them.

pub mod logic;
pub mod types;

pub use types::*;

//! Utility modules: JSON persistence, sample statistics.

pub mod persistence;
pub mod sample_stats;

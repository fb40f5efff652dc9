//! Simulation configuration.

use crate::estimator::SIMULATION_SAMPLE_SIZE;
use crate::tiers::Tier;
use serde::{Deserialize, Serialize};

/// Configuration for a strategy comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Independent trials per policy
    pub num_trials: u32,

    /// Attempts each trial may spend
    pub budget: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Estimator samples per slot when the greedy policy decides
    pub greedy_sample_size: usize,

    /// Tier the hybrid-rush policy drives every slot to first
    pub rush_target: Tier,

    /// Buckets in each policy's value histogram
    pub histogram_bins: usize,

    /// Log verbosity (0 = silent, 1 = per-policy summary, 2 = every trial)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_trials: 200,
            budget: 500,
            seed: None,
            greedy_sample_size: SIMULATION_SAMPLE_SIZE,
            rush_target: Tier::Legendary,
            histogram_bins: 20,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Small run for a fast look at the policies
    pub fn quick() -> Self {
        Self {
            num_trials: 30,
            budget: 100,
            histogram_bins: 10,
            ..Default::default()
        }
    }

    /// Large run for stable quartiles
    pub fn thorough() -> Self {
        Self {
            num_trials: 2_000,
            budget: 1_000,
            histogram_bins: 40,
            ..Default::default()
        }
    }
}

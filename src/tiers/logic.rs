use super::types::*;
use crate::error::LoadError;
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::debug;

impl TierTable {
    /// Build a table from explicit parameters, validating every entry.
    pub fn new(
        params: impl IntoIterator<Item = (Tier, TransitionParams)>,
    ) -> Result<Self, LoadError> {
        let table = Self {
            params: params.into_iter().collect(),
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let table: TierTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let table = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), tiers = table.params.len(), "loaded tier table");
        Ok(table)
    }

    fn validate(&self) -> Result<(), LoadError> {
        for (&tier, params) in &self.params {
            if !(0.0..=1.0).contains(&params.rate) {
                return Err(LoadError::InvalidRate {
                    tier,
                    rate: params.rate,
                });
            }
            if params.pity_cap == 0 {
                return Err(LoadError::ZeroPityCap { tier });
            }
            if params.next <= tier {
                return Err(LoadError::InvalidNextTier {
                    tier,
                    next: params.next,
                });
            }
        }
        Ok(())
    }

    pub fn params(&self, tier: Tier) -> Option<&TransitionParams> {
        self.params.get(&tier)
    }

    pub fn next(&self, tier: Tier) -> Option<Tier> {
        self.params.get(&tier).map(|p| p.next)
    }

    pub fn is_terminal(&self, tier: Tier) -> bool {
        !self.params.contains_key(&tier)
    }

    /// Probability that the attempt made after `roll_count` failures transitions.
    pub fn transition_probability(&self, tier: Tier, roll_count: u32) -> f64 {
        match self.params.get(&tier) {
            None => 0.0,
            Some(p) if roll_count.saturating_add(1) >= p.pity_cap => 1.0,
            Some(p) => p.rate,
        }
    }

    /// Decide whether the next attempt at `tier` transitions. Callers own the
    /// `roll_count`/`tier` bookkeeping.
    pub fn should_transition<R: Rng>(&self, tier: Tier, roll_count: u32, rng: &mut R) -> bool {
        let Some(p) = self.params.get(&tier) else {
            return false;
        };
        if roll_count.saturating_add(1) >= p.pity_cap {
            return true;
        }
        rng.gen::<f64>() < p.rate
    }

    /// Expected number of attempts to leave `tier` from a fresh roll count,
    /// accounting for pity. `None` for terminal tiers.
    pub fn expected_attempts(&self, tier: Tier) -> Option<f64> {
        let p = self.params.get(&tier)?;
        let cap = p.pity_cap as f64;
        if p.rate <= 0.0 {
            return Some(cap);
        }
        // Sum of P(attempt k is reached) for k = 1..=cap
        Some((1.0 - (1.0 - p.rate).powf(cap)) / p.rate)
    }
}

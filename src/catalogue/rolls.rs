use super::data::default_catalogue;
use super::types::*;
use crate::error::LoadError;
use crate::tiers::Tier;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Merged options for one line index with the total weight cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedLine {
    options: Vec<RewardOption>,
    total_weight: f64,
}

impl WeightedLine {
    pub fn new(options: Vec<RewardOption>) -> Self {
        let total_weight = options.iter().map(|o| o.weight).sum();
        Self {
            options,
            total_weight,
        }
    }

    pub fn options(&self) -> &[RewardOption] {
        &self.options
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Weighted random choice. `None` only for an empty line.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&RewardOption> {
        let last = self.options.last()?;
        let mut remaining = rng.gen::<f64>() * self.total_weight;
        for option in &self.options {
            remaining -= option.weight;
            if remaining <= 0.0 {
                return Some(option);
            }
        }
        // Float drift can leave a sliver of weight unconsumed
        Some(last)
    }
}

/// Probability of each option, in catalogue order.
pub fn option_probabilities(line: &WeightedLine) -> Vec<f64> {
    if line.total_weight <= 0.0 {
        return vec![0.0; line.len()];
    }
    line.options
        .iter()
        .map(|o| o.weight / line.total_weight)
        .collect()
}

/// Merged, weight-cached lines for every `(position, tier)` pair.
#[derive(Debug, Clone, Default)]
pub struct RollTable {
    lines: HashMap<(Position, Tier), [WeightedLine; 3]>,
}

impl RollTable {
    /// Merge a catalogue. Position-specific options come first, generic
    /// options follow; nothing is deduplicated.
    pub fn from_catalogue(catalogue: &RewardCatalogue) -> Result<Self, LoadError> {
        validate_catalogue(catalogue)?;

        let empty = LineSet::default();
        let mut lines = HashMap::new();
        for position in Position::ALL {
            for tier in Tier::ALL {
                let generic = catalogue.tiers.get(&tier).unwrap_or(&empty);
                let specific = catalogue
                    .positions
                    .get(&position)
                    .and_then(|m| m.get(&tier))
                    .unwrap_or(&empty);

                let merged = [0, 1, 2].map(|i| {
                    let mut options = specific.lines()[i].to_vec();
                    options.extend_from_slice(generic.lines()[i]);
                    WeightedLine::new(options)
                });
                lines.insert((position, tier), merged);
            }
        }

        Ok(Self { lines })
    }

    /// Table built from the bundled catalogue.
    pub fn builtin() -> Result<Self, LoadError> {
        Self::from_catalogue(&default_catalogue())
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let catalogue: RewardCatalogue = serde_json::from_str(json)?;
        Self::from_catalogue(&catalogue)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let table = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), "loaded reward catalogue");
        Ok(table)
    }

    /// The three lines at `(position, tier)`; empty lines when absent.
    pub fn lines(&self, position: Position, tier: Tier) -> Option<&[WeightedLine; 3]> {
        self.lines.get(&(position, tier))
    }

    pub fn line(&self, position: Position, tier: Tier, index: usize) -> Option<&WeightedLine> {
        self.lines.get(&(position, tier)).and_then(|l| l.get(index))
    }

    /// Roll all three lines at once.
    pub fn sample_lines<R: Rng>(
        &self,
        position: Position,
        tier: Tier,
        rng: &mut R,
    ) -> [Option<RewardOption>; 3] {
        match self.lines.get(&(position, tier)) {
            Some(lines) => [
                lines[0].sample(rng).copied(),
                lines[1].sample(rng).copied(),
                lines[2].sample(rng).copied(),
            ],
            None => [None; 3],
        }
    }
}

fn validate_line_set(set: &LineSet, context: &str) -> Result<(), LoadError> {
    for (i, line) in set.lines().iter().enumerate() {
        for option in line.iter() {
            if !(option.weight.is_finite() && option.weight > 0.0) {
                return Err(LoadError::InvalidWeight {
                    stat: option.stat.label().to_string(),
                    weight: option.weight,
                    context: format!("{context} line{}", i + 1),
                });
            }
            if !option.magnitude.is_finite() {
                return Err(LoadError::InvalidMagnitude {
                    stat: option.stat.label().to_string(),
                    context: format!("{context} line{}", i + 1),
                });
            }
        }
    }
    Ok(())
}

pub fn validate_catalogue(catalogue: &RewardCatalogue) -> Result<(), LoadError> {
    for (tier, set) in &catalogue.tiers {
        validate_line_set(set, tier.name())?;
    }
    for (position, per_tier) in &catalogue.positions {
        for (tier, set) in per_tier {
            validate_line_set(set, &format!("{} {}", position.name(), tier.name()))?;
        }
    }
    Ok(())
}

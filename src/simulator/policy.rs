//! Allocation policies: which slot receives the next attempt.

use crate::estimator::select_best_slot;
use crate::game_data::GameData;
use crate::slots::{aggregate_gain, SlotState};
use crate::stats::Evaluator;
use crate::tiers::{Tier, TierTable};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Policy {
    /// Lowest current gain
    WorstFirst,
    /// Largest deficit below the mean gain. Picks the same slot as
    /// `WorstFirst`; only its trial seeds differ in a comparison.
    BalancedThreshold,
    /// Every slot to `target` in slot order, then worst-first
    HybridRush { target: Tier },
    /// Worst-first with slots near a guaranteed transition discounted
    RarityWeightedWorstFirst,
    /// Highest estimated marginal gain
    GreedyExpectedValue,
}

impl Policy {
    /// The five policies, hybrid-rush aimed at `rush_target`.
    pub fn all(rush_target: Tier) -> [Policy; 5] {
        [
            Policy::WorstFirst,
            Policy::BalancedThreshold,
            Policy::HybridRush {
                target: rush_target,
            },
            Policy::RarityWeightedWorstFirst,
            Policy::GreedyExpectedValue,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::WorstFirst => "Worst-First",
            Policy::BalancedThreshold => "Balanced-Threshold",
            Policy::HybridRush { .. } => "Hybrid-Rush",
            Policy::RarityWeightedWorstFirst => "Rarity-Weighted",
            Policy::GreedyExpectedValue => "Greedy-EV",
        }
    }

    /// Parse a CLI-style policy name; `rush_target` fills in hybrid-rush.
    pub fn from_name(name: &str, rush_target: Tier) -> Option<Policy> {
        match name.to_lowercase().replace('_', "-").as_str() {
            "worst-first" | "worst" => Some(Policy::WorstFirst),
            "balanced-threshold" | "balanced" => Some(Policy::BalancedThreshold),
            "hybrid-rush" | "hybrid" | "rush" => Some(Policy::HybridRush {
                target: rush_target,
            }),
            "rarity-weighted" | "rarity" => Some(Policy::RarityWeightedWorstFirst),
            "greedy-ev" | "greedy" => Some(Policy::GreedyExpectedValue),
            _ => None,
        }
    }

    /// Index of the slot to attempt next, or `None` when there is nothing
    /// to choose from. Ties go to the earliest slot.
    pub fn choose<R: Rng>(
        &self,
        slots: &[SlotState],
        data: &GameData,
        evaluator: &Evaluator,
        sample_size: usize,
        rng: &mut R,
    ) -> Option<usize> {
        match self {
            Policy::WorstFirst => worst_first(slots),
            Policy::BalancedThreshold => balanced_threshold(slots),
            Policy::HybridRush { target } => {
                rush_candidate(slots, &data.tiers, *target).or_else(|| worst_first(slots))
            }
            Policy::RarityWeightedWorstFirst => rarity_weighted(slots, &data.tiers),
            Policy::GreedyExpectedValue => {
                select_best_slot(slots, data, evaluator, sample_size, rng).map(|c| c.index)
            }
        }
    }
}

/// First index with the strictly lowest score.
fn argmin_by(slots: &[SlotState], score: impl Fn(&SlotState) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, slot) in slots.iter().enumerate() {
        let s = score(slot);
        match best {
            Some((_, current)) if s >= current => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

fn worst_first(slots: &[SlotState]) -> Option<usize> {
    argmin_by(slots, |s| s.cached_value_gain)
}

/// Largest `mean - gain`. The mean is shared by every slot, so this is the
/// same argmin as `worst_first`, ties included. With every slot at the mean
/// the first slot is chosen.
fn balanced_threshold(slots: &[SlotState]) -> Option<usize> {
    if slots.is_empty() {
        return None;
    }
    let mean = aggregate_gain(slots) / slots.len() as f64;
    argmin_by(slots, |s| -(mean - s.cached_value_gain))
}

/// First slot, in slot order, still below `target` and able to climb.
fn rush_candidate(slots: &[SlotState], tiers: &TierTable, target: Tier) -> Option<usize> {
    slots
        .iter()
        .position(|s| s.tier < target && tiers.next(s.tier).is_some())
}

fn rarity_weighted(slots: &[SlotState], tiers: &TierTable) -> Option<usize> {
    argmin_by(slots, |s| rarity_score(s, tiers))
}

/// `gain × (1 − 0.5 × proximity)` where proximity is the share of the
/// tier's expected attempts already spent, capped at 1.
pub fn rarity_score(slot: &SlotState, tiers: &TierTable) -> f64 {
    let proximity = match tiers.expected_attempts(slot.tier) {
        Some(expected) if expected > 0.0 => (slot.roll_count as f64 / expected).min(1.0),
        _ => 0.0,
    };
    slot.cached_value_gain * (1.0 - 0.5 * proximity)
}

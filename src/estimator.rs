//! Monte Carlo estimate of what one more attempt on a slot is worth, and the
//! greedy choice of slot built on it.

use crate::game_data::GameData;
use crate::slots::SlotState;
use crate::stats::Evaluator;
use crate::utils::sample_stats::AnchoredMean;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Samples per estimate inside budget simulations.
pub const SIMULATION_SAMPLE_SIZE: usize = 20;

/// Samples per estimate when advising a player.
pub const GUIDANCE_SAMPLE_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginalGain {
    /// Mean value gain of the lines one attempt would produce
    pub expected_value_after: f64,
    /// `expected_value_after` minus the slot's current gain; may be negative
    pub marginal_gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotChoice {
    /// Index into the slice passed to `select_best_slot`
    pub index: usize,
    pub slot_id: u32,
    pub marginal_gain: f64,
}

/// Estimate the value of one more attempt on `slot` without mutating it.
///
/// Each sample first decides whether the attempt would transition, using the
/// same pity-aware probability as a real attempt, then rolls three lines at
/// the resulting tier. A `sample_size` of zero is treated as one.
pub fn expected_marginal_gain<R: Rng>(
    slot: &SlotState,
    data: &GameData,
    evaluator: &Evaluator,
    sample_size: usize,
    rng: &mut R,
) -> MarginalGain {
    let next = data.tiers.next(slot.tier);
    let p = data.tiers.transition_probability(slot.tier, slot.roll_count);

    let mut acc = AnchoredMean::new();
    for _ in 0..sample_size.max(1) {
        let roll_tier = match next {
            Some(next) if rng.gen::<f64>() < p => next,
            _ => slot.tier,
        };
        let lines = data.rolls.sample_lines(slot.position, roll_tier, rng);
        acc.push(evaluator.lines_gain(&lines));
    }

    let expected_value_after = acc.mean().unwrap_or(0.0);
    MarginalGain {
        expected_value_after,
        marginal_gain: expected_value_after - slot.cached_value_gain,
    }
}

/// The slot whose next attempt has the highest expected marginal gain.
/// Earlier slots win ties; an empty slice gives `None`.
pub fn select_best_slot<R: Rng>(
    slots: &[SlotState],
    data: &GameData,
    evaluator: &Evaluator,
    sample_size: usize,
    rng: &mut R,
) -> Option<SlotChoice> {
    let mut best: Option<SlotChoice> = None;
    for (index, slot) in slots.iter().enumerate() {
        let estimate = expected_marginal_gain(slot, data, evaluator, sample_size, rng);
        let better = match best {
            None => true,
            Some(current) => estimate.marginal_gain > current.marginal_gain,
        };
        if better {
            best = Some(SlotChoice {
                index,
                slot_id: slot.id,
                marginal_gain: estimate.marginal_gain,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{LineSet, Position, RewardCatalogue, RewardOption, RewardStat};
    use crate::stats::{ClassConfig, DamageFormula, StatBundle};
    use crate::tiers::{Tier, TierTable};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn evaluator() -> Evaluator {
        Evaluator::new(
            Arc::new(DamageFormula::default()),
            Some(ClassConfig::warrior()),
            StatBundle::default(),
        )
        .unwrap()
    }

    /// Every line at `tier` can only roll one boss damage option.
    fn single_option_data(tier: Tier, magnitude: f64) -> GameData {
        let only = vec![RewardOption::new(RewardStat::BossDamage, magnitude, 1.0)];
        let mut catalogue = RewardCatalogue::default();
        catalogue.tiers.insert(
            tier,
            LineSet {
                line1: only.clone(),
                line2: only.clone(),
                line3: only,
            },
        );
        GameData::new(TierTable::default(), &catalogue).unwrap()
    }

    #[test]
    fn test_zero_variance_is_exact() {
        let data = single_option_data(Tier::Ancient, 10.0);
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let slot = SlotState::new(0, Position::Hat, Tier::Ancient);

        let analytic = eval.lines_gain(&data.rolls.sample_lines(Position::Hat, Tier::Ancient, &mut rng));
        let estimate = expected_marginal_gain(&slot, &data, &eval, 50, &mut rng);
        assert_eq!(estimate.expected_value_after, analytic);
        assert_eq!(estimate.marginal_gain, analytic);
    }

    #[test]
    fn test_marginal_gain_subtracts_current() {
        let data = single_option_data(Tier::Ancient, 10.0);
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut slot = SlotState::new(0, Position::Hat, Tier::Ancient);
        slot.cached_value_gain = 100.0;

        let estimate = expected_marginal_gain(&slot, &data, &eval, 5, &mut rng);
        assert_eq!(estimate.marginal_gain, estimate.expected_value_after - 100.0);
        assert!(estimate.marginal_gain < 0.0);
    }

    #[test]
    fn test_zero_sample_size_takes_one_sample() {
        let data = single_option_data(Tier::Ancient, 10.0);
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let slot = SlotState::new(0, Position::Hat, Tier::Ancient);
        let estimate = expected_marginal_gain(&slot, &data, &eval, 0, &mut rng);
        assert!(estimate.expected_value_after > 0.0);
    }

    #[test]
    fn test_forced_transition_rolls_next_tier() {
        // Lines exist only at Rare, so a Normal slot at its pity edge must
        // sample Rare lines every time
        let data = single_option_data(Tier::Rare, 4.0);
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut slot = SlotState::new(0, Position::Hat, Tier::Normal);
        slot.roll_count = 16;

        let estimate = expected_marginal_gain(&slot, &data, &eval, 30, &mut rng);
        let rare = RewardOption::new(RewardStat::BossDamage, 4.0, 1.0);
        assert_eq!(estimate.expected_value_after, eval.lines_gain(&[Some(rare); 3]));
    }

    #[test]
    fn test_select_best_slot_argmax() {
        let data = single_option_data(Tier::Ancient, 10.0);
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut slots: Vec<SlotState> = (0..3)
            .map(|i| SlotState::new(i, Position::Hat, Tier::Ancient))
            .collect();
        slots[0].cached_value_gain = 20.0;
        slots[1].cached_value_gain = 5.0;
        slots[2].cached_value_gain = 12.0;

        let choice = select_best_slot(&slots, &data, &eval, 10, &mut rng).unwrap();
        assert_eq!(choice.index, 1);
        assert_eq!(choice.slot_id, 1);
    }

    #[test]
    fn test_select_best_slot_tie_prefers_first() {
        let data = single_option_data(Tier::Ancient, 10.0);
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let slots: Vec<SlotState> = (0..4)
            .map(|i| SlotState::new(10 + i, Position::Hat, Tier::Ancient))
            .collect();

        let choice = select_best_slot(&slots, &data, &eval, 10, &mut rng).unwrap();
        assert_eq!(choice.index, 0);
        assert_eq!(choice.slot_id, 10);
    }

    #[test]
    fn test_select_best_slot_empty() {
        let data = GameData::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(select_best_slot(&[], &data, &evaluator(), 10, &mut rng).is_none());
    }

    #[test]
    fn test_selector_does_not_mutate() {
        let data = GameData::builtin().unwrap();
        let eval = evaluator();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let slots = vec![
            SlotState::new(0, Position::Weapon, Tier::Epic),
            SlotState::new(1, Position::Gloves, Tier::Unique),
        ];
        let before = slots.clone();
        select_best_slot(&slots, &data, &eval, 20, &mut rng);
        assert_eq!(slots, before);
    }
}

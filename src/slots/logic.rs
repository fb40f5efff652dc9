use super::types::*;
use crate::game_data::GameData;
use crate::stats::Evaluator;
use rand::Rng;

impl SlotState {
    /// Recompute `cached_value_gain` from the current lines.
    pub fn refresh_gain(&mut self, evaluator: &Evaluator) -> f64 {
        self.cached_value_gain = evaluator.lines_gain(&self.current_lines);
        self.cached_value_gain
    }

    /// Spend one attempt on this slot.
    ///
    /// The transition is resolved against the failures counted before this
    /// attempt, so the `pity_cap`-th consecutive attempt always transitions.
    pub fn roll<R: Rng>(
        &mut self,
        data: &GameData,
        evaluator: &Evaluator,
        rng: &mut R,
    ) -> AttemptOutcome {
        let old_tier = self.tier;
        let old_gain = self.cached_value_gain;

        let transitioned = match data.tiers.next(self.tier) {
            Some(next) if data.tiers.should_transition(self.tier, self.roll_count, rng) => {
                self.tier = next;
                self.roll_count = 0;
                true
            }
            _ => {
                self.roll_count = self.roll_count.saturating_add(1);
                false
            }
        };

        self.current_lines = data.rolls.sample_lines(self.position, self.tier, rng);
        let new_gain = self.refresh_gain(evaluator);

        AttemptOutcome {
            transitioned,
            old_tier,
            new_tier: self.tier,
            old_gain,
            new_gain,
        }
    }
}

/// Recompute every slot's cached gain, returning the aggregate.
pub fn refresh_all(slots: &mut [SlotState], evaluator: &Evaluator) -> f64 {
    slots.iter_mut().map(|s| s.refresh_gain(evaluator)).sum()
}

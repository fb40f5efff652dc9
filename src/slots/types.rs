use crate::catalogue::{Position, RewardOption};
use crate::tiers::Tier;
use serde::{Deserialize, Serialize};

/// One equipment slot being upgraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    pub id: u32,
    pub position: Position,
    pub tier: Tier,
    /// Attempts since the last tier transition
    pub roll_count: u32,
    pub current_lines: [Option<RewardOption>; 3],
    /// Value gain of `current_lines`, kept in sync by `roll` and `refresh_gain`
    pub cached_value_gain: f64,
}

impl SlotState {
    /// A fresh slot with no lines.
    pub fn new(id: u32, position: Position, tier: Tier) -> Self {
        Self {
            id,
            position,
            tier,
            roll_count: 0,
            current_lines: [None; 3],
            cached_value_gain: 0.0,
        }
    }

    pub fn with_lines(mut self, lines: [Option<RewardOption>; 3]) -> Self {
        self.current_lines = lines;
        self
    }

    pub fn line_count(&self) -> usize {
        self.current_lines.iter().flatten().count()
    }
}

/// Outcome of one attempt on a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptOutcome {
    pub transitioned: bool,
    pub old_tier: Tier,
    pub new_tier: Tier,
    pub old_gain: f64,
    pub new_gain: f64,
}

/// One zeroed slot per position at `tier`, ids in position order.
pub fn default_slots(positions: &[Position], tier: Tier) -> Vec<SlotState> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| SlotState::new(i as u32, position, tier))
        .collect()
}

/// Sum of the slots' cached gains.
pub fn aggregate_gain(slots: &[SlotState]) -> f64 {
    slots.iter().map(|s| s.cached_value_gain).sum()
}

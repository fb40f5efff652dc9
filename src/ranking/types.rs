use crate::catalogue::{Position, RewardOption, RewardStat};
use crate::tiers::Tier;
use serde::{Deserialize, Serialize};

/// Gains below this percentage are treated as no meaningful effect.
pub const MIN_RANKING_GAIN: f64 = 0.01;

/// Combinations evaluated per job step when the engine drives a job itself.
pub const RANKING_CHUNK_SIZE: usize = 2_000;

pub type RankingKey = (Position, Tier);

/// One distinct three-line combination and its value gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub lines: [RewardOption; 3],
    pub value_gain: f64,
}

impl RankingEntry {
    pub fn combo_key(&self) -> ComboKey {
        ComboKey::new(&self.lines)
    }
}

/// Identity of one line for deduplication. Magnitudes compare by bit pattern
/// so no formatting precision is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub stat: RewardStat,
    pub magnitude_bits: u64,
    pub is_prime: bool,
}

impl From<&RewardOption> for LineKey {
    fn from(option: &RewardOption) -> Self {
        // -0.0 and 0.0 are the same magnitude
        let magnitude = if option.magnitude == 0.0 {
            0.0
        } else {
            option.magnitude
        };
        Self {
            stat: option.stat,
            magnitude_bits: magnitude.to_bits(),
            is_prime: option.is_prime,
        }
    }
}

/// Order-independent identity of a three-line combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComboKey([LineKey; 3]);

impl ComboKey {
    pub fn new(lines: &[RewardOption; 3]) -> Self {
        let mut keys = [
            LineKey::from(&lines[0]),
            LineKey::from(&lines[1]),
            LineKey::from(&lines[2]),
        ];
        keys.sort();
        Self(keys)
    }
}

/// Progress of a ranking job; `processed` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingProgress {
    pub processed: usize,
    pub total: usize,
}

impl RankingProgress {
    pub fn is_done(&self) -> bool {
        self.processed >= self.total
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_key_ignores_order() {
        let a = RewardOption::prime(RewardStat::StrPct, 12.0, 1.0);
        let b = RewardOption::new(RewardStat::StrPct, 9.0, 1.0);
        let c = RewardOption::new(RewardStat::BossDamage, 35.0, 1.0);
        assert_eq!(ComboKey::new(&[a, b, c]), ComboKey::new(&[c, a, b]));
    }

    #[test]
    fn test_combo_key_distinguishes_prime() {
        let prime = RewardOption::prime(RewardStat::StrPct, 12.0, 1.0);
        let plain = RewardOption::new(RewardStat::StrPct, 12.0, 1.0);
        assert_ne!(
            ComboKey::new(&[prime, plain, plain]),
            ComboKey::new(&[plain, plain, plain])
        );
    }

    #[test]
    fn test_combo_key_ignores_weight() {
        let heavy = RewardOption::new(RewardStat::Str, 12.0, 5.0);
        let light = RewardOption::new(RewardStat::Str, 12.0, 0.5);
        assert_eq!(
            ComboKey::new(&[heavy, heavy, heavy]),
            ComboKey::new(&[light, light, light])
        );
    }

    #[test]
    fn test_progress_fraction() {
        let empty = RankingProgress { processed: 0, total: 0 };
        assert!(empty.is_done());
        assert_eq!(empty.fraction(), 1.0);
        let half = RankingProgress { processed: 5, total: 10 };
        assert!(!half.is_done());
        assert_eq!(half.fraction(), 0.5);
    }
}

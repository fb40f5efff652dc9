//! Built-in reward catalogue used when no external catalogue is supplied.
//!
//! Line 1 always rolls prime options. Lines 2 and 3 roll prime options at a
//! reduced weight and otherwise fall back to the previous tier's magnitudes.

use super::types::{LineSet, Position, RewardCatalogue, RewardOption, RewardStat};
use crate::tiers::Tier;
use std::collections::BTreeMap;

// Magnitudes indexed by tier (Normal..Ancient). Zero means "not rollable".
const FLAT_STAT: [f64; 7] = [6.0, 12.0, 18.0, 24.0, 30.0, 36.0, 42.0];
const STAT_PCT: [f64; 7] = [1.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0];
const ALL_STAT_PCT: [f64; 7] = [0.0, 0.0, 3.0, 6.0, 9.0, 12.0, 15.0];
const MAX_HP: [f64; 7] = [60.0, 120.0, 180.0, 240.0, 300.0, 360.0, 420.0];
const MAX_HP_PCT: [f64; 7] = [1.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0];
const DEFENSE: [f64; 7] = [10.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0];

const ATTACK: [f64; 7] = [3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0];
const ATTACK_PCT: [f64; 7] = [0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0];
const DAMAGE_PCT: [f64; 7] = [0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0];
const BOSS_DAMAGE: [f64; 7] = [0.0, 0.0, 0.0, 30.0, 35.0, 40.0, 45.0];
const IGNORE_DEFENSE: [f64; 7] = [0.0, 0.0, 0.0, 30.0, 35.0, 40.0, 45.0];
const CRIT_RATE: [f64; 7] = [0.0, 0.0, 3.0, 6.0, 9.0, 12.0, 15.0];
const CRIT_DAMAGE: [f64; 7] = [0.0, 0.0, 0.0, 0.0, 8.0, 10.0, 12.0];

const LINE2_PRIME_SHARE: f64 = 0.2;
const LINE3_PRIME_SHARE: f64 = 0.08;

struct StatRow {
    stat: RewardStat,
    magnitudes: &'static [f64; 7],
    weight: f64,
}

const GENERIC_ROWS: &[StatRow] = &[
    StatRow { stat: RewardStat::Str, magnitudes: &FLAT_STAT, weight: 2.0 },
    StatRow { stat: RewardStat::Dex, magnitudes: &FLAT_STAT, weight: 2.0 },
    StatRow { stat: RewardStat::Int, magnitudes: &FLAT_STAT, weight: 2.0 },
    StatRow { stat: RewardStat::Luk, magnitudes: &FLAT_STAT, weight: 2.0 },
    StatRow { stat: RewardStat::StrPct, magnitudes: &STAT_PCT, weight: 2.0 },
    StatRow { stat: RewardStat::DexPct, magnitudes: &STAT_PCT, weight: 2.0 },
    StatRow { stat: RewardStat::IntPct, magnitudes: &STAT_PCT, weight: 2.0 },
    StatRow { stat: RewardStat::LukPct, magnitudes: &STAT_PCT, weight: 2.0 },
    StatRow { stat: RewardStat::AllStatPct, magnitudes: &ALL_STAT_PCT, weight: 1.0 },
    StatRow { stat: RewardStat::MaxHp, magnitudes: &MAX_HP, weight: 1.5 },
    StatRow { stat: RewardStat::MaxHpPct, magnitudes: &MAX_HP_PCT, weight: 1.5 },
    StatRow { stat: RewardStat::Defense, magnitudes: &DEFENSE, weight: 1.5 },
];

const WEAPON_ROWS: &[StatRow] = &[
    StatRow { stat: RewardStat::AttackPct, magnitudes: &ATTACK_PCT, weight: 1.5 },
    StatRow { stat: RewardStat::MagicAttackPct, magnitudes: &ATTACK_PCT, weight: 1.5 },
    StatRow { stat: RewardStat::Damage, magnitudes: &DAMAGE_PCT, weight: 1.5 },
    StatRow { stat: RewardStat::BossDamage, magnitudes: &BOSS_DAMAGE, weight: 1.0 },
    StatRow { stat: RewardStat::IgnoreDefense, magnitudes: &IGNORE_DEFENSE, weight: 1.0 },
];

const GLOVE_ROWS: &[StatRow] = &[
    StatRow { stat: RewardStat::CritDamage, magnitudes: &CRIT_DAMAGE, weight: 1.0 },
];

const ACCESSORY_ROWS: &[StatRow] = &[
    StatRow { stat: RewardStat::Attack, magnitudes: &ATTACK, weight: 1.0 },
    StatRow { stat: RewardStat::MagicAttack, magnitudes: &ATTACK, weight: 1.0 },
    StatRow { stat: RewardStat::CritRate, magnitudes: &CRIT_RATE, weight: 1.0 },
];

fn tier_index(tier: Tier) -> usize {
    tier as usize
}

/// Build the three lines for `rows` at `tier`.
fn build_lines(rows: &[StatRow], tier: Tier) -> LineSet {
    let idx = tier_index(tier);
    let mut set = LineSet::default();

    for row in rows {
        let prime = row.magnitudes[idx];
        if prime <= 0.0 {
            continue;
        }
        let is_prime = tier != Tier::Normal;
        let option = RewardOption {
            stat: row.stat,
            magnitude: prime,
            weight: row.weight,
            is_prime,
        };
        set.line1.push(option);

        if !is_prime {
            set.line2.push(option);
            set.line3.push(option);
            continue;
        }

        set.line2.push(RewardOption {
            weight: row.weight * LINE2_PRIME_SHARE,
            ..option
        });
        set.line3.push(RewardOption {
            weight: row.weight * LINE3_PRIME_SHARE,
            ..option
        });

        let lower = row.magnitudes[idx - 1];
        if lower > 0.0 {
            let fallback = RewardOption::new(row.stat, lower, row.weight);
            set.line2.push(fallback);
            set.line3.push(fallback);
        }
    }

    set
}

fn position_rows(position: Position) -> &'static [StatRow] {
    match position {
        Position::Weapon | Position::Secondary | Position::Emblem => WEAPON_ROWS,
        Position::Gloves => GLOVE_ROWS,
        Position::Pendant | Position::Ring | Position::Earring => ACCESSORY_ROWS,
        _ => &[],
    }
}

/// The built-in catalogue.
pub fn default_catalogue() -> RewardCatalogue {
    let tiers = Tier::ALL
        .iter()
        .map(|&tier| (tier, build_lines(GENERIC_ROWS, tier)))
        .collect();

    let mut positions = BTreeMap::new();
    for position in Position::ALL {
        let rows = position_rows(position);
        if rows.is_empty() {
            continue;
        }
        let per_tier: BTreeMap<Tier, LineSet> = Tier::ALL
            .iter()
            .map(|&tier| (tier, build_lines(rows, tier)))
            .filter(|(_, set)| !set.line1.is_empty())
            .collect();
        positions.insert(position, per_tier);
    }

    RewardCatalogue { tiers, positions }
}

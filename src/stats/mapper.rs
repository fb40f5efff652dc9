//! Converts rolled reward lines into stat bundle deltas.

use super::types::{AttackKind, ClassConfig, MainStat, StatBundle, StatKey};
use crate::catalogue::{RewardOption, RewardStat};

/// Contribution of one reward line to the stat bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDelta {
    pub key: Option<StatKey>,
    pub delta: f64,
    /// The reward was a primary-stat percentage; the caller must add its
    /// magnitude to the running accumulated percentage.
    pub is_primary_pct: bool,
}

impl StatDelta {
    pub const NONE: StatDelta = StatDelta {
        key: None,
        delta: 0.0,
        is_primary_pct: false,
    };

    fn flat(key: StatKey, delta: f64) -> Self {
        Self {
            key: Some(key),
            delta,
            is_primary_pct: false,
        }
    }
}

fn flat_stat(stat: RewardStat) -> Option<MainStat> {
    match stat {
        RewardStat::Str => Some(MainStat::Str),
        RewardStat::Dex => Some(MainStat::Dex),
        RewardStat::Int => Some(MainStat::Int),
        RewardStat::Luk => Some(MainStat::Luk),
        _ => None,
    }
}

fn pct_stat(stat: RewardStat) -> Option<MainStat> {
    match stat {
        RewardStat::StrPct => Some(MainStat::Str),
        RewardStat::DexPct => Some(MainStat::Dex),
        RewardStat::IntPct => Some(MainStat::Int),
        RewardStat::LukPct => Some(MainStat::Luk),
        _ => None,
    }
}

/// Extra total primary stat from adding `pct` percent on top of `bonus_pct`.
///
/// `total` already includes `bonus_pct`, so the unscaled base is recovered
/// first and the new bonus is applied to it.
pub fn compound_primary_pct(total: f64, bonus_pct: f64, pct: f64) -> f64 {
    let scale = 1.0 + bonus_pct / 100.0;
    if scale <= 0.0 {
        return 0.0;
    }
    let base = total / scale;
    let new_total = base * (1.0 + (bonus_pct + pct) / 100.0);
    new_total - total
}

/// Flat primary stat `amount` as it shows up in a total that carries
/// `bonus_pct`.
pub fn scale_flat_primary(amount: f64, bonus_pct: f64) -> f64 {
    let scale = 1.0 + bonus_pct / 100.0;
    if scale <= 0.0 {
        return 0.0;
    }
    amount * scale
}

/// Map a reward to its stat delta for `class`.
///
/// `accumulated_primary_pct` is the primary-stat percentage already granted by
/// earlier lines of the same combination. Without a class nothing applies.
pub fn map_to_stat_delta(
    reward: &RewardOption,
    class: Option<&ClassConfig>,
    stats: &StatBundle,
    accumulated_primary_pct: f64,
) -> StatDelta {
    let Some(class) = class else {
        return StatDelta::NONE;
    };
    let magnitude = reward.magnitude;
    let bonus = stats.primary_stat_pct + accumulated_primary_pct;

    if let Some(main) = flat_stat(reward.stat) {
        return if main == class.primary {
            StatDelta::flat(StatKey::PrimaryStat, scale_flat_primary(magnitude, bonus))
        } else if main == class.secondary {
            StatDelta::flat(StatKey::SecondaryStat, magnitude)
        } else {
            StatDelta::NONE
        };
    }

    let primary_pct = match reward.stat {
        RewardStat::AllStatPct => true,
        stat => pct_stat(stat) == Some(class.primary),
    };
    if primary_pct {
        return StatDelta {
            key: Some(StatKey::PrimaryStat),
            delta: compound_primary_pct(stats.primary_stat, bonus, magnitude),
            is_primary_pct: true,
        };
    }

    match (reward.stat, class.attack) {
        (RewardStat::Attack, AttackKind::Physical)
        | (RewardStat::MagicAttack, AttackKind::Magic) => {
            StatDelta::flat(StatKey::Attack, magnitude)
        }
        (RewardStat::AttackPct, AttackKind::Physical)
        | (RewardStat::MagicAttackPct, AttackKind::Magic) => {
            StatDelta::flat(StatKey::AttackPct, magnitude)
        }
        (RewardStat::Damage, _) => StatDelta::flat(StatKey::DamagePct, magnitude),
        (RewardStat::BossDamage, _) => StatDelta::flat(StatKey::BossDamagePct, magnitude),
        (RewardStat::CritRate, _) => StatDelta::flat(StatKey::CritRate, magnitude),
        (RewardStat::CritDamage, _) => StatDelta::flat(StatKey::CritDamage, magnitude),
        (RewardStat::IgnoreDefense, _) => StatDelta::flat(StatKey::IgnoreDefense, magnitude),
        (RewardStat::MaxHp, _) => StatDelta::flat(StatKey::MaxHp, magnitude),
        (RewardStat::Defense, _) => match class.defense_to_primary {
            Some(ratio) => {
                StatDelta::flat(StatKey::PrimaryStat, scale_flat_primary(magnitude * ratio, bonus))
            }
            None => StatDelta::flat(StatKey::Defense, magnitude),
        },
        _ => StatDelta::NONE,
    }
}

/// Apply reward lines in order, threading the accumulated primary percentage.
pub fn apply_lines<'a>(
    stats: &StatBundle,
    class: Option<&ClassConfig>,
    lines: impl IntoIterator<Item = &'a RewardOption>,
) -> StatBundle {
    let mut modified = *stats;
    let mut accumulated_pct = 0.0;

    for reward in lines {
        let change = map_to_stat_delta(reward, class, &modified, accumulated_pct);
        if let Some(key) = change.key {
            modified.add(key, change.delta);
        }
        if change.is_primary_pct {
            accumulated_pct += reward.magnitude;
        }
    }

    modified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(primary: f64, pct: f64) -> StatBundle {
        StatBundle {
            primary_stat: primary,
            primary_stat_pct: pct,
            ..StatBundle::default()
        }
    }

    #[test]
    fn test_compounding_without_existing_bonus_is_linear() {
        let p = 1234.0;
        for d in [1.0, 6.0, 12.0, 33.0] {
            let delta = compound_primary_pct(p, 0.0, d);
            assert!((delta - p * d / 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_compounding_with_existing_bonus() {
        // base 1000 with +50% => 1500 total; +10% more => 1600
        let delta = compound_primary_pct(1500.0, 50.0, 10.0);
        assert!((delta - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_compounding_degenerate_scale() {
        assert_eq!(compound_primary_pct(1000.0, -100.0, 10.0), 0.0);
    }

    #[test]
    fn test_map_primary_pct_uses_compounding() {
        let class = ClassConfig::warrior();
        let reward = RewardOption::new(RewardStat::StrPct, 10.0, 1.0);
        let delta = map_to_stat_delta(&reward, Some(&class), &stats(1500.0, 50.0), 0.0);
        assert_eq!(delta.key, Some(StatKey::PrimaryStat));
        assert!(delta.is_primary_pct);
        assert!((delta.delta - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_without_class_has_no_effect() {
        let reward = RewardOption::new(RewardStat::BossDamage, 40.0, 1.0);
        let delta = map_to_stat_delta(&reward, None, &StatBundle::default(), 0.0);
        assert_eq!(delta, StatDelta::NONE);
    }

    #[test]
    fn test_off_class_stats_have_no_effect() {
        let class = ClassConfig::warrior();
        let base = StatBundle::default();
        for stat in [
            RewardStat::IntPct,
            RewardStat::Luk,
            RewardStat::MagicAttack,
            RewardStat::MagicAttackPct,
        ] {
            let reward = RewardOption::new(stat, 9.0, 1.0);
            assert_eq!(
                map_to_stat_delta(&reward, Some(&class), &base, 0.0).key,
                None,
                "{stat:?} should not apply to a warrior"
            );
        }
    }

    #[test]
    fn test_secondary_flat_stat() {
        let class = ClassConfig::mage();
        let reward = RewardOption::new(RewardStat::Luk, 12.0, 1.0);
        let delta = map_to_stat_delta(&reward, Some(&class), &StatBundle::default(), 0.0);
        assert_eq!(delta.key, Some(StatKey::SecondaryStat));
        assert_eq!(delta.delta, 12.0);
    }

    #[test]
    fn test_defense_conversion() {
        let reward = RewardOption::new(RewardStat::Defense, 80.0, 1.0);
        let base = StatBundle::default();

        let guardian = map_to_stat_delta(&reward, Some(&ClassConfig::guardian()), &base, 0.0);
        assert_eq!(guardian.key, Some(StatKey::PrimaryStat));
        assert_eq!(guardian.delta, 20.0);

        let warrior = map_to_stat_delta(&reward, Some(&ClassConfig::warrior()), &base, 0.0);
        assert_eq!(warrior.key, Some(StatKey::Defense));
    }

    #[test]
    fn test_apply_lines_threads_accumulated_pct() {
        let class = ClassConfig::warrior();
        let base = stats(1000.0, 0.0);
        let lines = [
            RewardOption::new(RewardStat::StrPct, 10.0, 1.0),
            RewardOption::new(RewardStat::AllStatPct, 10.0, 1.0),
            RewardOption::new(RewardStat::StrPct, 10.0, 1.0),
        ];
        let result = apply_lines(&base, Some(&class), lines.iter());
        // Percentages stack additively on the unscaled base: 1000 * 1.30
        assert!((result.primary_stat - 1300.0).abs() < 1e-9);
        assert_eq!(result.primary_stat_pct, 0.0);
    }

    #[test]
    fn test_apply_lines_flat_stats_order_independent() {
        let class = ClassConfig::warrior();
        let base = stats(2000.0, 25.0);
        let a = RewardOption::new(RewardStat::StrPct, 12.0, 1.0);
        let b = RewardOption::new(RewardStat::Str, 30.0, 1.0);
        let c = RewardOption::new(RewardStat::AttackPct, 9.0, 1.0);

        let forward = apply_lines(&base, Some(&class), [&a, &b, &c]);
        let reverse = apply_lines(&base, Some(&class), [&c, &b, &a]);
        assert!((forward.attack_pct - reverse.attack_pct).abs() < 1e-9);
        assert!((forward.primary_stat - reverse.primary_stat).abs() < 1e-9);
        // unscaled 1600 + 30 flat, at 25% + 12%
        assert!((forward.primary_stat - 1630.0 * 1.37).abs() < 1e-9);
    }

    #[test]
    fn test_flat_primary_carries_existing_bonus() {
        let class = ClassConfig::warrior();
        let reward = RewardOption::new(RewardStat::Str, 30.0, 1.0);
        let delta = map_to_stat_delta(&reward, Some(&class), &stats(2000.0, 25.0), 12.0);
        assert_eq!(delta.key, Some(StatKey::PrimaryStat));
        assert!(!delta.is_primary_pct);
        assert!((delta.delta - 41.1).abs() < 1e-9);
    }

    #[test]
    fn test_defense_conversion_order_independent() {
        let class = ClassConfig::guardian();
        let base = stats(1800.0, 20.0);
        let def = RewardOption::new(RewardStat::Defense, 120.0, 1.0);
        let all = RewardOption::new(RewardStat::AllStatPct, 9.0, 1.0);

        let forward = apply_lines(&base, Some(&class), [&def, &all]);
        let reverse = apply_lines(&base, Some(&class), [&all, &def]);
        assert!((forward.primary_stat - reverse.primary_stat).abs() < 1e-9);
    }
}

use super::mapper::apply_lines;
use super::types::{ClassConfig, StatBundle};
use crate::catalogue::RewardOption;
use crate::error::GuidanceError;
use std::fmt;
use std::sync::Arc;

/// Baseline values with a smaller magnitude cannot anchor a percentage gain.
pub const MIN_BASELINE_VALUE: f64 = 1e-9;

/// Scalar value (DPS or similar) of a stat bundle. Must be pure.
pub trait ValueFunction: Send + Sync {
    fn value(&self, stats: &StatBundle) -> f64;
}

impl<F> ValueFunction for F
where
    F: Fn(&StatBundle) -> f64 + Send + Sync,
{
    fn value(&self, stats: &StatBundle) -> f64 {
        self(stats)
    }
}

/// Reference damage formula used by the CLI and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageFormula {
    /// Target defense as a fraction of damage blocked before ignore-defense
    pub boss_defense: f64,
    pub base_crit_damage: f64,
}

impl Default for DamageFormula {
    fn default() -> Self {
        Self {
            boss_defense: 0.5,
            base_crit_damage: 35.0,
        }
    }
}

impl ValueFunction for DamageFormula {
    fn value(&self, s: &StatBundle) -> f64 {
        let stat_factor = (4.0 * s.primary_stat + s.secondary_stat) / 100.0;
        let attack = s.attack * (1.0 + s.attack_pct / 100.0);
        let damage_mult = 1.0 + (s.damage_pct + s.boss_damage_pct) / 100.0;

        let crit_rate = s.crit_rate.clamp(0.0, 100.0) / 100.0;
        let crit_mult = 1.0 + crit_rate * (self.base_crit_damage + s.crit_damage) / 100.0;

        let ignore = s.ignore_defense.clamp(0.0, 100.0) / 100.0;
        let defense_mult = (1.0 - self.boss_defense * (1.0 - ignore)).clamp(0.0, 1.0);

        stat_factor * attack * damage_mult * crit_mult * defense_mult
    }
}

/// Percentage change of `modified` over `baseline`; `None` when undefined.
pub fn percent_gain(baseline: f64, modified: f64) -> Option<f64> {
    if !baseline.is_finite() || baseline.abs() < MIN_BASELINE_VALUE {
        return None;
    }
    let gain = (modified - baseline) / baseline * 100.0;
    gain.is_finite().then_some(gain)
}

/// Baseline, class and value function bundled after their preconditions
/// have been checked. Every gain it reports is finite.
#[derive(Clone)]
pub struct Evaluator {
    value_fn: Arc<dyn ValueFunction>,
    class: ClassConfig,
    baseline: StatBundle,
    baseline_value: f64,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("class", &self.class.name)
            .field("baseline_value", &self.baseline_value)
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    pub fn new(
        value_fn: Arc<dyn ValueFunction>,
        class: Option<ClassConfig>,
        baseline: StatBundle,
    ) -> Result<Self, GuidanceError> {
        let class = class.ok_or(GuidanceError::NoActiveClass)?;
        let baseline_value = value_fn.value(&baseline);
        if percent_gain(baseline_value, baseline_value).is_none() {
            return Err(GuidanceError::DegenerateBaseline {
                value: baseline_value,
            });
        }
        Ok(Self {
            value_fn,
            class,
            baseline,
            baseline_value,
        })
    }

    pub fn class(&self) -> &ClassConfig {
        &self.class
    }

    pub fn baseline(&self) -> &StatBundle {
        &self.baseline
    }

    pub fn baseline_value(&self) -> f64 {
        self.baseline_value
    }

    /// Percentage value gain of a modified bundle. Non-finite results count
    /// as no gain.
    pub fn gain_of(&self, modified: &StatBundle) -> f64 {
        percent_gain(self.baseline_value, self.value_fn.value(modified)).unwrap_or(0.0)
    }

    /// Gain from applying `lines` to the baseline.
    pub fn options_gain<'a>(&self, lines: impl IntoIterator<Item = &'a RewardOption>) -> f64 {
        let modified = apply_lines(&self.baseline, Some(&self.class), lines);
        self.gain_of(&modified)
    }

    /// Gain of a slot's three lines; empty lines contribute nothing.
    pub fn lines_gain(&self, lines: &[Option<RewardOption>; 3]) -> f64 {
        self.options_gain(lines.iter().flatten())
    }
}

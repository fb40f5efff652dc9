use crate::tiers::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Weapon,
    Secondary,
    Emblem,
    Hat,
    Top,
    Bottom,
    Shoes,
    Gloves,
    Cape,
    Shoulder,
    Belt,
    Pendant,
    Ring,
    Earring,
}

impl Position {
    pub const ALL: [Position; 14] = [
        Position::Weapon,
        Position::Secondary,
        Position::Emblem,
        Position::Hat,
        Position::Top,
        Position::Bottom,
        Position::Shoes,
        Position::Gloves,
        Position::Cape,
        Position::Shoulder,
        Position::Belt,
        Position::Pendant,
        Position::Ring,
        Position::Earring,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Position::Weapon => "Weapon",
            Position::Secondary => "Secondary",
            Position::Emblem => "Emblem",
            Position::Hat => "Hat",
            Position::Top => "Top",
            Position::Bottom => "Bottom",
            Position::Shoes => "Shoes",
            Position::Gloves => "Gloves",
            Position::Cape => "Cape",
            Position::Shoulder => "Shoulder",
            Position::Belt => "Belt",
            Position::Pendant => "Pendant",
            Position::Ring => "Ring",
            Position::Earring => "Earring",
        }
    }

    pub fn from_name(name: &str) -> Option<Position> {
        Position::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Weapon, secondary and emblem share the offensive line pool.
    pub fn is_weapon_like(&self) -> bool {
        matches!(
            self,
            Position::Weapon | Position::Secondary | Position::Emblem
        )
    }
}

/// Stat named by a reward line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStat {
    Str,
    Dex,
    Int,
    Luk,
    StrPct,
    DexPct,
    IntPct,
    LukPct,
    AllStatPct,
    Attack,
    MagicAttack,
    AttackPct,
    MagicAttackPct,
    Damage,
    BossDamage,
    CritRate,
    CritDamage,
    IgnoreDefense,
    MaxHp,
    MaxHpPct,
    Defense,
}

impl RewardStat {
    pub fn label(&self) -> &'static str {
        match self {
            RewardStat::Str => "STR",
            RewardStat::Dex => "DEX",
            RewardStat::Int => "INT",
            RewardStat::Luk => "LUK",
            RewardStat::StrPct => "STR%",
            RewardStat::DexPct => "DEX%",
            RewardStat::IntPct => "INT%",
            RewardStat::LukPct => "LUK%",
            RewardStat::AllStatPct => "All Stat%",
            RewardStat::Attack => "ATT",
            RewardStat::MagicAttack => "MATT",
            RewardStat::AttackPct => "ATT%",
            RewardStat::MagicAttackPct => "MATT%",
            RewardStat::Damage => "Damage%",
            RewardStat::BossDamage => "Boss Damage%",
            RewardStat::CritRate => "Crit Rate%",
            RewardStat::CritDamage => "Crit Damage%",
            RewardStat::IgnoreDefense => "Ignore DEF%",
            RewardStat::MaxHp => "Max HP",
            RewardStat::MaxHpPct => "Max HP%",
            RewardStat::Defense => "DEF",
        }
    }
}

/// One rollable line outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardOption {
    pub stat: RewardStat,
    pub magnitude: f64,
    pub weight: f64,
    /// Boosted variant; displayed distinctly, calculated identically
    #[serde(default)]
    pub is_prime: bool,
}

impl RewardOption {
    pub fn new(stat: RewardStat, magnitude: f64, weight: f64) -> Self {
        Self {
            stat,
            magnitude,
            weight,
            is_prime: false,
        }
    }

    pub fn prime(stat: RewardStat, magnitude: f64, weight: f64) -> Self {
        Self {
            stat,
            magnitude,
            weight,
            is_prime: true,
        }
    }

    /// e.g. "STR% +12" or "STR% +12 (prime)"
    pub fn describe(&self) -> String {
        if self.is_prime {
            format!("{} +{} (prime)", self.stat.label(), self.magnitude)
        } else {
            format!("{} +{}", self.stat.label(), self.magnitude)
        }
    }
}

/// Options for the three line positions at one tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSet {
    #[serde(default)]
    pub line1: Vec<RewardOption>,
    #[serde(default)]
    pub line2: Vec<RewardOption>,
    #[serde(default)]
    pub line3: Vec<RewardOption>,
}

impl LineSet {
    pub fn lines(&self) -> [&[RewardOption]; 3] {
        [&self.line1, &self.line2, &self.line3]
    }
}

/// Static reward data: tier-generic lines plus position-specific additions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardCatalogue {
    #[serde(default)]
    pub tiers: BTreeMap<Tier, LineSet>,
    #[serde(default)]
    pub positions: BTreeMap<Position, BTreeMap<Tier, LineSet>>,
}

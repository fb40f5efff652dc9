use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Normal = 0,
    Rare = 1,
    Epic = 2,
    Unique = 3,
    Legendary = 4,
    Mystic = 5,
    Ancient = 6,
}

impl Tier {
    pub const ALL: [Tier; 7] = [
        Tier::Normal,
        Tier::Rare,
        Tier::Epic,
        Tier::Unique,
        Tier::Legendary,
        Tier::Mystic,
        Tier::Ancient,
    ];

    /// Returns the display name for this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Normal => "Normal",
            Tier::Rare => "Rare",
            Tier::Epic => "Epic",
            Tier::Unique => "Unique",
            Tier::Legendary => "Legendary",
            Tier::Mystic => "Mystic",
            Tier::Ancient => "Ancient",
        }
    }

    pub fn from_name(name: &str) -> Option<Tier> {
        Tier::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

/// Upgrade behaviour of one non-terminal tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionParams {
    /// Chance of moving to `next` on a single attempt (0.0-1.0)
    pub rate: f64,
    /// The attempt number at which the transition is guaranteed
    pub pity_cap: u32,
    pub next: Tier,
}

/// Tier transition table. Tiers without an entry are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable {
    pub(super) params: BTreeMap<Tier, TransitionParams>,
}

pub const NORMAL_TO_RARE: TransitionParams = TransitionParams {
    rate: 0.06,
    pity_cap: 17,
    next: Tier::Rare,
};
pub const RARE_TO_EPIC: TransitionParams = TransitionParams {
    rate: 0.03,
    pity_cap: 34,
    next: Tier::Epic,
};
pub const EPIC_TO_UNIQUE: TransitionParams = TransitionParams {
    rate: 0.015,
    pity_cap: 67,
    next: Tier::Unique,
};
pub const UNIQUE_TO_LEGENDARY: TransitionParams = TransitionParams {
    rate: 0.006,
    pity_cap: 167,
    next: Tier::Legendary,
};
pub const LEGENDARY_TO_MYSTIC: TransitionParams = TransitionParams {
    rate: 0.0025,
    pity_cap: 400,
    next: Tier::Mystic,
};
pub const MYSTIC_TO_ANCIENT: TransitionParams = TransitionParams {
    rate: 0.001,
    pity_cap: 1000,
    next: Tier::Ancient,
};

impl Default for TierTable {
    fn default() -> Self {
        let params = BTreeMap::from([
            (Tier::Normal, NORMAL_TO_RARE),
            (Tier::Rare, RARE_TO_EPIC),
            (Tier::Epic, EPIC_TO_UNIQUE),
            (Tier::Unique, UNIQUE_TO_LEGENDARY),
            (Tier::Legendary, LEGENDARY_TO_MYSTIC),
            (Tier::Mystic, MYSTIC_TO_ANCIENT),
        ]);
        Self { params }
    }
}

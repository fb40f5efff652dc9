use serde::{Deserialize, Serialize};

/// Stat bundle fed to the value function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBundle {
    /// Total primary stat, with `primary_stat_pct` already applied
    pub primary_stat: f64,
    /// Percentage bonus already baked into `primary_stat`
    pub primary_stat_pct: f64,
    pub secondary_stat: f64,
    pub attack: f64,
    pub attack_pct: f64,
    pub damage_pct: f64,
    pub boss_damage_pct: f64,
    pub crit_rate: f64,
    pub crit_damage: f64,
    pub ignore_defense: f64,
    pub max_hp: f64,
    pub defense: f64,
}

impl Default for StatBundle {
    fn default() -> Self {
        Self {
            primary_stat: 1000.0,
            primary_stat_pct: 0.0,
            secondary_stat: 200.0,
            attack: 100.0,
            attack_pct: 0.0,
            damage_pct: 0.0,
            boss_damage_pct: 0.0,
            crit_rate: 5.0,
            crit_damage: 0.0,
            ignore_defense: 0.0,
            max_hp: 5000.0,
            defense: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKey {
    PrimaryStat,
    SecondaryStat,
    Attack,
    AttackPct,
    DamagePct,
    BossDamagePct,
    CritRate,
    CritDamage,
    IgnoreDefense,
    MaxHp,
    Defense,
}

impl StatBundle {
    pub fn get(&self, key: StatKey) -> f64 {
        match key {
            StatKey::PrimaryStat => self.primary_stat,
            StatKey::SecondaryStat => self.secondary_stat,
            StatKey::Attack => self.attack,
            StatKey::AttackPct => self.attack_pct,
            StatKey::DamagePct => self.damage_pct,
            StatKey::BossDamagePct => self.boss_damage_pct,
            StatKey::CritRate => self.crit_rate,
            StatKey::CritDamage => self.crit_damage,
            StatKey::IgnoreDefense => self.ignore_defense,
            StatKey::MaxHp => self.max_hp,
            StatKey::Defense => self.defense,
        }
    }

    pub fn add(&mut self, key: StatKey, delta: f64) {
        let field = match key {
            StatKey::PrimaryStat => &mut self.primary_stat,
            StatKey::SecondaryStat => &mut self.secondary_stat,
            StatKey::Attack => &mut self.attack,
            StatKey::AttackPct => &mut self.attack_pct,
            StatKey::DamagePct => &mut self.damage_pct,
            StatKey::BossDamagePct => &mut self.boss_damage_pct,
            StatKey::CritRate => &mut self.crit_rate,
            StatKey::CritDamage => &mut self.crit_damage,
            StatKey::IgnoreDefense => &mut self.ignore_defense,
            StatKey::MaxHp => &mut self.max_hp,
            StatKey::Defense => &mut self.defense,
        };
        *field += delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainStat {
    Str,
    Dex,
    Int,
    Luk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Physical,
    Magic,
}

/// Class context consumed by the reward mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    pub name: String,
    pub primary: MainStat,
    pub secondary: MainStat,
    pub attack: AttackKind,
    /// Flat primary stat granted per point of DEF rolled
    #[serde(default)]
    pub defense_to_primary: Option<f64>,
}

impl ClassConfig {
    pub fn warrior() -> Self {
        Self {
            name: "Warrior".to_string(),
            primary: MainStat::Str,
            secondary: MainStat::Dex,
            attack: AttackKind::Physical,
            defense_to_primary: None,
        }
    }

    /// Warrior variant that converts DEF into STR.
    pub fn guardian() -> Self {
        Self {
            name: "Guardian".to_string(),
            defense_to_primary: Some(0.25),
            ..Self::warrior()
        }
    }

    pub fn mage() -> Self {
        Self {
            name: "Mage".to_string(),
            primary: MainStat::Int,
            secondary: MainStat::Luk,
            attack: AttackKind::Magic,
            defense_to_primary: None,
        }
    }

    pub fn archer() -> Self {
        Self {
            name: "Archer".to_string(),
            primary: MainStat::Dex,
            secondary: MainStat::Str,
            attack: AttackKind::Physical,
            defense_to_primary: None,
        }
    }

    pub fn thief() -> Self {
        Self {
            name: "Thief".to_string(),
            primary: MainStat::Luk,
            secondary: MainStat::Dex,
            attack: AttackKind::Physical,
            defense_to_primary: None,
        }
    }

    pub fn presets() -> Vec<ClassConfig> {
        vec![
            Self::warrior(),
            Self::guardian(),
            Self::mage(),
            Self::archer(),
            Self::thief(),
        ]
    }

    pub fn preset(name: &str) -> Option<ClassConfig> {
        Self::presets()
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_add_roundtrip() {
        let mut stats = StatBundle::default();
        let before = stats.get(StatKey::BossDamagePct);
        stats.add(StatKey::BossDamagePct, 30.0);
        assert_eq!(stats.get(StatKey::BossDamagePct), before + 30.0);
    }

    #[test]
    fn test_preset_lookup_case_insensitive() {
        assert_eq!(ClassConfig::preset("MAGE"), Some(ClassConfig::mage()));
        assert!(ClassConfig::preset("bard").is_none());
    }

    #[test]
    fn test_guardian_converts_defense() {
        let guardian = ClassConfig::guardian();
        assert_eq!(guardian.primary, MainStat::Str);
        assert_eq!(guardian.defense_to_primary, Some(0.25));
        assert_eq!(ClassConfig::warrior().defense_to_primary, None);
    }
}

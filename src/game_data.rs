//! Read-only balance data shared by every ranking, estimate and trial.

use crate::catalogue::{RewardCatalogue, RollTable};
use crate::error::LoadError;
use crate::tiers::TierTable;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct GameData {
    pub tiers: TierTable,
    pub rolls: RollTable,
}

impl GameData {
    pub fn new(tiers: TierTable, catalogue: &RewardCatalogue) -> Result<Self, LoadError> {
        Ok(Self {
            tiers,
            rolls: RollTable::from_catalogue(catalogue)?,
        })
    }

    /// Bundled tier table and catalogue.
    pub fn builtin() -> Result<Self, LoadError> {
        Ok(Self {
            tiers: TierTable::default(),
            rolls: RollTable::builtin()?,
        })
    }

    /// Load external data files, falling back to the bundled data for any
    /// path that is not given.
    pub fn load(tiers: Option<&Path>, catalogue: Option<&Path>) -> Result<Self, LoadError> {
        let tiers = match tiers {
            Some(path) => TierTable::load(path)?,
            None => TierTable::default(),
        };
        let rolls = match catalogue {
            Some(path) => RollTable::load(path)?,
            None => RollTable::builtin()?,
        };
        info!(
            custom_tiers = tiers_is_custom(&tiers),
            "game data ready"
        );
        Ok(Self { tiers, rolls })
    }
}

fn tiers_is_custom(tiers: &TierTable) -> bool {
    *tiers != TierTable::default()
}

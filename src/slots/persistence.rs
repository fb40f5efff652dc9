//! Persisted slot state: what the player currently has equipped.

use super::types::SlotState;
use crate::catalogue::{Position, RewardOption};
use crate::error::LoadError;
use crate::tiers::{Tier, TierTable};
use crate::utils::persistence::{load_json, save_json};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSlot {
    pub id: u32,
    pub position: Position,
    pub tier: Tier,
    #[serde(default)]
    pub roll_count: u32,
    #[serde(default)]
    pub current_lines: Vec<RewardOption>,
}

impl From<&SlotState> for PersistedSlot {
    fn from(slot: &SlotState) -> Self {
        Self {
            id: slot.id,
            position: slot.position,
            tier: slot.tier,
            roll_count: slot.roll_count,
            current_lines: slot.current_lines.iter().flatten().copied().collect(),
        }
    }
}

/// Convert persisted records into slot state, rejecting anything a
/// simulation could not start from. Cached gains are left at zero.
pub fn slots_from_persisted(
    persisted: &[PersistedSlot],
    tiers: &TierTable,
) -> Result<Vec<SlotState>, LoadError> {
    let mut seen = HashSet::new();
    let mut slots = Vec::with_capacity(persisted.len());

    for record in persisted {
        if !seen.insert(record.id) {
            return Err(LoadError::DuplicateSlot(record.id));
        }
        if let Some(params) = tiers.params(record.tier) {
            if record.roll_count >= params.pity_cap {
                return Err(LoadError::RollCountOverPity {
                    id: record.id,
                    tier: record.tier,
                    roll_count: record.roll_count,
                    pity_cap: params.pity_cap,
                });
            }
        }
        if record.current_lines.len() > 3 {
            return Err(LoadError::TooManyLines {
                id: record.id,
                position: record.position,
                count: record.current_lines.len(),
            });
        }
        for line in &record.current_lines {
            if !line.magnitude.is_finite() {
                return Err(LoadError::InvalidMagnitude {
                    stat: line.stat.label().to_string(),
                    context: format!("slot {}", record.id),
                });
            }
        }

        let mut lines = [None; 3];
        for (dst, line) in lines.iter_mut().zip(&record.current_lines) {
            *dst = Some(*line);
        }
        let mut slot = SlotState::new(record.id, record.position, record.tier).with_lines(lines);
        slot.roll_count = record.roll_count;
        slots.push(slot);
    }

    Ok(slots)
}

pub fn load_slots(path: &Path, tiers: &TierTable) -> Result<Vec<SlotState>, LoadError> {
    let persisted: Vec<PersistedSlot> = load_json(path)?;
    let slots = slots_from_persisted(&persisted, tiers)?;
    debug!(path = %path.display(), count = slots.len(), "loaded slot state");
    Ok(slots)
}

pub fn save_slots(path: &Path, slots: &[SlotState]) -> io::Result<()> {
    let persisted: Vec<PersistedSlot> = slots.iter().map(PersistedSlot::from).collect();
    save_json(path, &persisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::RewardStat;

    fn record(id: u32, tier: Tier, roll_count: u32) -> PersistedSlot {
        PersistedSlot {
            id,
            position: Position::Hat,
            tier,
            roll_count,
            current_lines: vec![RewardOption::new(RewardStat::StrPct, 6.0, 1.0)],
        }
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        let tiers = TierTable::default();
        let slots = slots_from_persisted(&[record(1, Tier::Epic, 10), record(2, Tier::Rare, 0)], &tiers)
            .unwrap();

        save_slots(&path, &slots).unwrap();
        let loaded = load_slots(&path, &tiers).unwrap();
        assert_eq!(loaded, slots);
        assert_eq!(loaded[0].roll_count, 10);
        assert_eq!(loaded[0].line_count(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tiers = TierTable::default();
        let result = slots_from_persisted(&[record(1, Tier::Epic, 0), record(1, Tier::Rare, 0)], &tiers);
        assert!(matches!(result, Err(LoadError::DuplicateSlot(1))));
    }

    #[test]
    fn test_roll_count_at_pity_rejected() {
        let tiers = TierTable::default();
        let result = slots_from_persisted(&[record(4, Tier::Normal, 17)], &tiers);
        assert!(matches!(result, Err(LoadError::RollCountOverPity { id: 4, .. })));
    }

    #[test]
    fn test_terminal_tier_roll_count_unbounded() {
        let tiers = TierTable::default();
        let slots = slots_from_persisted(&[record(4, Tier::Ancient, 5000)], &tiers).unwrap();
        assert_eq!(slots[0].roll_count, 5000);
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let tiers = TierTable::default();
        let mut bad = record(2, Tier::Rare, 0);
        bad.current_lines = vec![bad.current_lines[0]; 4];
        assert!(matches!(
            slots_from_persisted(&[bad], &tiers),
            Err(LoadError::TooManyLines { count: 4, .. })
        ));
    }

    #[test]
    fn test_malformed_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        std::fs::write(&path, r#"[{ "id": 1, "position": "hat", "tier": "shiny" }]"#).unwrap();
        assert!(matches!(
            load_slots(&path, &TierTable::default()),
            Err(LoadError::Json(_))
        ));
    }
}

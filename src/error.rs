//! Error types for data loading and guidance preconditions.

use crate::catalogue::Position;
use crate::tiers::Tier;
use thiserror::Error;

/// Failures raised while loading catalogue, tier, or slot data.
///
/// All of these are detected before any simulation starts.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid weight {weight} for {stat} in {context}")]
    InvalidWeight {
        stat: String,
        weight: f64,
        context: String,
    },

    #[error("non-finite magnitude for {stat} in {context}")]
    InvalidMagnitude { stat: String, context: String },

    #[error("transition rate {rate} for {tier:?} is outside [0, 1]")]
    InvalidRate { tier: Tier, rate: f64 },

    #[error("pity cap for {tier:?} must be at least 1")]
    ZeroPityCap { tier: Tier },

    #[error("{tier:?} cannot transition to {next:?}")]
    InvalidNextTier { tier: Tier, next: Tier },

    #[error("slot {id} has roll count {roll_count} at or above the {tier:?} pity cap {pity_cap}")]
    RollCountOverPity {
        id: u32,
        tier: Tier,
        roll_count: u32,
        pity_cap: u32,
    },

    #[error("duplicate slot id {0}")]
    DuplicateSlot(u32),

    #[error("slot {id} ({position:?}) has {count} lines, expected at most 3")]
    TooManyLines {
        id: u32,
        position: Position,
        count: usize,
    },
}

/// Preconditions that must hold before gains can be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuidanceError {
    #[error("no active class selected")]
    NoActiveClass,

    #[error("baseline value {value} is too small to compute percentage gains")]
    DegenerateBaseline { value: f64 },
}

//! Slot state and the per-attempt mutation shared by every policy.

pub mod logic;
pub mod persistence;
pub mod types;

pub use logic::refresh_all;
pub use persistence::*;
pub use types::*;

//! Reward catalogue: the weighted line options each tier can roll.

pub mod data;
pub mod rolls;
pub mod types;

pub use data::default_catalogue;
pub use rolls::*;
pub use types::*;

//! Short-rate models.

pub mod hull_white;

pub use hull_white::{BondOptionType, HullWhite};

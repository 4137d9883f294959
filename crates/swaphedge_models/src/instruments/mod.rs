//! Interest-rate instruments: swaps and European swaptions.

pub mod swap;
pub mod swaption;

pub use swap::{InterestRateSwap, SwapDirection};
pub use swaption::Swaption;

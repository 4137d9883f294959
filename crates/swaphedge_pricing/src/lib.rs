//! # Swaphedge Pricing (simulation and orchestration layer)
//!
//! The layer that turns calibrated models into numbers:
//!
//! - `rng`: seeded pseudo-random number generation for reproducible
//!   simulations
//! - `mc`: Monte Carlo European swaption pricing under Hull-White, with
//!   deterministic parallel reduction
//! - `grid`: pricing sweeps over a maturity/tenor grid
//! - `hedging`: the per-date calibrate-then-price pipeline over a series
//!   of market snapshots

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod grid;
#[cfg(test)]
mod integration_tests;
pub mod hedging;
pub mod mc;
pub mod rng;

pub use error::{HedgingError, SimulationError};
pub use hedging::{HedgingConfig, HedgingRecord, HedgingSeriesRunner, MarketSnapshot};
pub use mc::{McResult, MonteCarloConfig, MonteCarloPricer};

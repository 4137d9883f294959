//! Hedging-series evaluation.
//!
//! Replays the same calibrate-then-price pipeline over a series of market
//! snapshots (one per valuation date) and reports the NPV of a fixed swap
//! and swaption pair on each date. Snapshots are independent, so dates
//! run in parallel with no shared mutable state.

mod runner;
mod snapshot;

pub use runner::{HedgingConfig, HedgingRecord, HedgingSeriesRunner};
pub use snapshot::MarketSnapshot;

//! # Swaphedge Models (model layer)
//!
//! Everything between the raw curve and the pricing engines:
//!
//! - `models`: the Hull-White one-factor short-rate model (analytic bond
//!   formula fitted to the input curve, exact simulation step)
//! - `instruments`: interest-rate swaps and European swaptions on plain
//!   year-fraction schedules
//! - `analytical`: normal distribution helpers, Black-76 pricing and
//!   implied-volatility inversion, the Jamshidian swaption decomposition
//! - `calibration`: least-squares calibration of `(a, sigma)` to a swaption
//!   volatility surface, with an outlier-robust refit pass

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analytical;
pub mod calibration;
pub mod error;
pub mod instruments;
pub mod models;

pub use error::{AnalyticalError, CalibrationError, ModelError, PricingError, ScheduleError};
pub use models::hull_white::HullWhite;

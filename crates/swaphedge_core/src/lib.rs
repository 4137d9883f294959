//! # Swaphedge Core (foundation layer)
//!
//! Shared numerical and market-data building blocks for the swaption
//! pricing and hedging engine:
//!
//! - `types`: dates, day counts and the error taxonomy
//! - `math`: interpolation and the numerical solvers (Levenberg-Marquardt,
//!   bracketed Newton-Raphson)
//! - `market_data`: the [`YieldCurve`](market_data::curves::YieldCurve)
//!   trait and the interpolated [`DiscountCurve`](market_data::curves::DiscountCurve)
//!
//! Everything here is pure computation: no I/O, no global state. Curve and
//! interpolation code is generic over `num_traits::Float`; the solvers are
//! `f64`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;

pub use market_data::curves::{DiscountCurve, FlatCurve, YieldCurve};
pub use types::error::{CurveError, DateError, InterpolationError, SolverError};
pub use types::time::{Date, DayCount};

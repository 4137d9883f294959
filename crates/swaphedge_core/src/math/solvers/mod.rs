//! Numerical solvers.
//!
//! - [`LevenbergMarquardtSolver`]: damped non-linear least squares, used by
//!   model calibration
//! - [`BracketedNewtonSolver`]: Newton-Raphson with a bisection fallback on
//!   a caller-supplied bracket, used by the critical-rate search and the
//!   implied-volatility inversion

pub mod levenberg_marquardt;
pub mod newton_raphson;

pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver};
pub use newton_raphson::BracketedNewtonSolver;

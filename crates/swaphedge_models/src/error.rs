//! Error taxonomy for the model layer.
//!
//! [`PricingError`] is the aggregate the pricing entry points return; the
//! per-concern enums convert into it with `?`. Calibration failure to
//! converge is deliberately *not* part of this taxonomy: the engine returns
//! best-effort parameters with a flag instead (see
//! [`crate::calibration::CalibrationOutcome`]), and [`CalibrationError`]
//! covers only hard input problems.

use thiserror::Error;

use swaphedge_core::types::error::{CurveError, SolverError};

/// Invalid short-rate model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ModelError {
    /// Mean reversion and volatility must both be strictly positive and
    /// finite.
    #[error("invalid model parameters: a = {a}, sigma = {sigma} (both must be > 0 and finite)")]
    InvalidParameters {
        /// Mean-reversion speed.
        a: f64,
        /// Short-rate volatility.
        sigma: f64,
    },
}

/// Invalid instrument schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The requested schedule has no payment periods.
    #[error("invalid schedule: {reason}")]
    InvalidSchedule {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl ScheduleError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            reason: reason.into(),
        }
    }
}

/// Invalid inputs to a closed-form pricing formula.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AnalyticalError {
    /// Volatility must be strictly positive.
    #[error("invalid volatility: {vol}")]
    InvalidVolatility {
        /// The rejected value.
        vol: f64,
    },

    /// Time to expiry must be strictly positive.
    #[error("invalid expiry: {expiry}")]
    InvalidExpiry {
        /// The rejected value, in years.
        expiry: f64,
    },

    /// Forward and strike must be strictly positive under Black-76.
    #[error("invalid rate input: forward = {forward}, strike = {strike}")]
    InvalidRate {
        /// Forward swap rate.
        forward: f64,
        /// Strike rate.
        strike: f64,
    },

    /// Annuity must be strictly positive.
    #[error("invalid annuity: {annuity}")]
    InvalidAnnuity {
        /// The rejected value.
        annuity: f64,
    },
}

/// Hard calibration input errors.
///
/// Non-convergence is not here: it is reported through the outcome flag.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// No usable calibration instruments were supplied (or all were
    /// filtered out before fitting).
    #[error("no calibration instruments (supplied {supplied}, usable {usable})")]
    NoInstruments {
        /// Instruments supplied by the caller.
        supplied: usize,
        /// Instruments that survived input validation.
        usable: usize,
    },

    /// The optimizer could not be started on the supplied instrument set
    /// (for example fewer residuals than parameters).
    #[error("optimizer setup failed: {0}")]
    Optimizer(#[from] SolverError),

    /// A calibration instrument could not be set up from the market data.
    #[error("cannot set up instrument {maturity_years}y x {tenor_years}y: {source}")]
    InstrumentSetup {
        /// Option maturity of the failing cell.
        maturity_years: f64,
        /// Underlying tenor of the failing cell.
        tenor_years: f64,
        /// Underlying cause.
        source: PricingError,
    },
}

/// Aggregate error for the pricing entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Curve construction or query failure.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Root-find or optimizer failure.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Invalid model parameters.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid closed-form inputs.
    #[error(transparent)]
    Analytical(#[from] AnalyticalError),

    /// Invalid instrument schedule.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::InvalidParameters { a: -0.1, sigma: 0.01 };
        assert!(err.to_string().contains("a = -0.1"));
    }

    #[test]
    fn test_curve_error_converts() {
        let err: PricingError = CurveError::invalid_data("bad").into();
        assert!(matches!(err, PricingError::Curve(_)));
    }

    #[test]
    fn test_solver_error_converts() {
        let err: PricingError = SolverError::NonPositiveDefinite.into();
        assert!(matches!(err, PricingError::Solver(_)));
    }
}

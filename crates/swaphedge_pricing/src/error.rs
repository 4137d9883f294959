//! Error taxonomy for the simulation and orchestration layer.

use thiserror::Error;

use swaphedge_core::types::error::CurveError;
use swaphedge_models::error::{CalibrationError, PricingError};

/// Monte Carlo simulation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Too many simulated paths produced a non-finite or non-positive
    /// annuity and had to be discarded.
    #[error("degenerate simulation: {excluded} of {total} paths discarded")]
    DegeneratePath {
        /// Paths that failed the sanity checks.
        excluded: usize,
        /// Total paths requested.
        total: usize,
    },

    /// The configuration is unusable.
    #[error("invalid simulation configuration: {reason}")]
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Curve query failure during payoff evaluation.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Model-layer failure while setting up the simulation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Failures of the hedging-series pipeline.
///
/// Each variant carries the snapshot label so a failing date can be found
/// in a long series.
#[derive(Debug, Error)]
pub enum HedgingError {
    /// The snapshot's curve data could not be turned into a discount
    /// curve.
    #[error("snapshot {label}: {source}")]
    Curve {
        /// Valuation-date label of the failing snapshot.
        label: String,
        /// Underlying cause.
        source: CurveError,
    },

    /// Calibration failed hard for a snapshot.
    #[error("snapshot {label}: {source}")]
    Calibration {
        /// Valuation-date label of the failing snapshot.
        label: String,
        /// Underlying cause.
        source: CalibrationError,
    },

    /// Pricing the hedged trade failed for a snapshot.
    #[error("snapshot {label}: {source}")]
    Pricing {
        /// Valuation-date label of the failing snapshot.
        label: String,
        /// Underlying cause.
        source: PricingError,
    },
}

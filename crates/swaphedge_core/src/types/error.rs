//! Error taxonomy for the foundation layer.
//!
//! Curve construction errors are fatal for the valuation date that raised
//! them; solver errors are surfaced to the caller, which decides whether the
//! condition is recoverable (implied-vol inversion inside a grid sweep) or
//! not (critical-rate search inside the analytic pricer).

use thiserror::Error;

/// Errors raised while building or querying a discount curve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// The supplied (date, discount factor) table is malformed.
    #[error("invalid curve data: {reason}")]
    InvalidCurveData {
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// A query was made for a negative time to maturity.
    #[error("invalid maturity: t = {t} is negative")]
    InvalidMaturity {
        /// The offending time, in years.
        t: f64,
    },
}

impl CurveError {
    /// Shorthand for [`CurveError::InvalidCurveData`].
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidCurveData {
            reason: reason.into(),
        }
    }
}

/// Errors raised by the interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterpolationError {
    /// Fewer points than the scheme requires.
    #[error("insufficient data points: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum number of points required.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// Abscissae and ordinates differ in length.
    #[error("x/y length mismatch: {x_len} vs {y_len}")]
    LengthMismatch {
        /// Number of x values.
        x_len: usize,
        /// Number of y values.
        y_len: usize,
    },

    /// Abscissae are not strictly increasing.
    #[error("x values must be strictly increasing (violation at index {index})")]
    NonMonotonic {
        /// Index of the first out-of-order element.
        index: usize,
    },
}

impl From<InterpolationError> for CurveError {
    fn from(err: InterpolationError) -> Self {
        CurveError::InvalidCurveData {
            reason: err.to_string(),
        }
    }
}

/// Errors raised when constructing or parsing dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The year/month/day triple does not form a valid calendar date.
    #[error("invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year component.
        year: i32,
        /// Month component.
        month: u32,
        /// Day component.
        day: u32,
    },

    /// The input string is not an ISO 8601 date.
    #[error("cannot parse date from '{input}'")]
    ParseError {
        /// The rejected input.
        input: String,
    },
}

/// Errors raised by the numerical solvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// A bracketed root search failed to bracket a sign change or to
    /// converge within its iteration budget.
    #[error("root-find failure after {iterations} iterations (last x = {last_x:.6e})")]
    RootFindFailure {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Last trial abscissa.
        last_x: f64,
    },

    /// An iterative inversion exhausted its budget without meeting tolerance.
    #[error("no convergence after {iterations} iterations (residual {residual:.3e})")]
    NoConvergence {
        /// Iterations performed.
        iterations: usize,
        /// Residual at the last iterate.
        residual: f64,
    },

    /// The search interval does not contain a sign change.
    #[error("no bracket: f({lo:.6e}) and f({hi:.6e}) have the same sign")]
    NoBracket {
        /// Lower bracket endpoint.
        lo: f64,
        /// Upper bracket endpoint.
        hi: f64,
    },

    /// The normal-equation matrix lost positive definiteness.
    #[error("normal-equation matrix is not positive definite")]
    NonPositiveDefinite,

    /// The residual function returned an empty or mismatched vector.
    #[error("invalid residual dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected residual count.
        expected: usize,
        /// Observed residual count.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_curve_data_display() {
        let err = CurveError::invalid_data("dates not strictly increasing");
        assert_eq!(
            err.to_string(),
            "invalid curve data: dates not strictly increasing"
        );
    }

    #[test]
    fn test_interpolation_error_converts_to_curve_error() {
        let err = InterpolationError::LengthMismatch { x_len: 3, y_len: 2 };
        let curve_err: CurveError = err.into();
        match curve_err {
            CurveError::InvalidCurveData { reason } => {
                assert!(reason.contains("length mismatch"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_bracket_display() {
        let err = SolverError::NoBracket { lo: 0.0, hi: 1.0 };
        assert!(err.to_string().contains("same sign"));
    }
}

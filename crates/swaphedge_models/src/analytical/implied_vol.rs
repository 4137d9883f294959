//! Black-76 implied-volatility inversion.
//!
//! Newton-Raphson on the Black-76 price with the analytic vega, safeguarded
//! by bisection on a `[min_vol, max_vol]` bracket. The achievable price
//! range is checked up front so an unattainable target fails fast instead
//! of burning the iteration budget.

use tracing::debug;

use swaphedge_core::math::solvers::BracketedNewtonSolver;
use swaphedge_core::types::error::SolverError;

use crate::error::AnalyticalError;
use crate::instruments::swap::SwapDirection;

use super::black76::{black76_swaption_price, black76_vega};

/// Inverts swaption prices to Black-76 volatilities.
///
/// # Example
///
/// ```
/// use swaphedge_models::analytical::black76::black76_swaption_price;
/// use swaphedge_models::analytical::implied_vol::ImpliedVolatilitySolver;
/// use swaphedge_models::instruments::swap::SwapDirection;
///
/// let price =
///     black76_swaption_price(SwapDirection::Payer, 0.05, 0.05, 0.25, 3.0, 4.0).unwrap();
///
/// let solver = ImpliedVolatilitySolver::default();
/// let vol = solver
///     .solve(price, SwapDirection::Payer, 0.05, 0.05, 3.0, 4.0)
///     .unwrap();
/// assert!((vol - 0.25).abs() < 1e-8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolatilitySolver {
    min_vol: f64,
    max_vol: f64,
    guess: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl Default for ImpliedVolatilitySolver {
    fn default() -> Self {
        Self {
            min_vol: 1e-4,
            max_vol: 4.0,
            guess: 0.2,
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl ImpliedVolatilitySolver {
    /// Sets the search bracket.
    pub fn with_bracket(mut self, min_vol: f64, max_vol: f64) -> Self {
        self.min_vol = min_vol;
        self.max_vol = max_vol;
        self
    }

    /// Sets the initial volatility guess.
    pub fn with_guess(mut self, guess: f64) -> Self {
        self.guess = guess;
        self
    }

    /// Sets the price tolerance and iteration cap.
    pub fn with_accuracy(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self
    }

    /// Solves for the volatility that reprices `target_price`.
    ///
    /// # Errors
    ///
    /// - [`AnalyticalError`] for invalid forward/strike/expiry/annuity
    /// - [`SolverError::NoConvergence`] when the target lies outside the
    ///   achievable price range for the bracket or the iteration budget is
    ///   exhausted
    pub fn solve(
        &self,
        target_price: f64,
        direction: SwapDirection,
        forward: f64,
        strike: f64,
        expiry: f64,
        annuity: f64,
    ) -> Result<f64, ImpliedVolError> {
        let price_at = |vol: f64| -> Result<f64, AnalyticalError> {
            black76_swaption_price(direction, forward, strike, vol, expiry, annuity)
        };

        // Achievable range over the bracket; prices are monotone in vol.
        let floor = price_at(self.min_vol)?;
        let ceiling = price_at(self.max_vol)?;
        if target_price < floor - self.tolerance || target_price > ceiling + self.tolerance {
            debug!(target_price, floor, ceiling, "target outside achievable range");
            return Err(ImpliedVolError::Solver(SolverError::NoConvergence {
                iterations: 0,
                residual: (target_price - target_price.clamp(floor, ceiling)).abs(),
            }));
        }

        let solver = BracketedNewtonSolver::new(self.tolerance, self.max_iterations);
        let root = solver
            .find_root(
                |vol| price_at(vol).unwrap_or(f64::NAN) - target_price,
                |vol| {
                    black76_vega(forward, strike, vol, expiry, annuity).unwrap_or(f64::NAN)
                },
                self.guess.clamp(self.min_vol, self.max_vol),
                self.min_vol,
                self.max_vol,
            )
            .map_err(|err| match err {
                SolverError::RootFindFailure {
                    iterations,
                    last_x,
                } => ImpliedVolError::Solver(SolverError::NoConvergence {
                    iterations,
                    residual: price_at(last_x)
                        .map(|p| (p - target_price).abs())
                        .unwrap_or(f64::NAN),
                }),
                other => ImpliedVolError::Solver(other),
            })?;

        Ok(root)
    }
}

/// Failure modes of the implied-volatility inversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImpliedVolError {
    /// Invalid Black-76 inputs.
    #[error(transparent)]
    Analytical(#[from] AnalyticalError),

    /// The inversion did not converge or the target is unattainable.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

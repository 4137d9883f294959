//! Newton-Raphson root finding with a bisection fallback.
//!
//! Used by the critical-rate search in the analytic swaption pricer and by
//! the Black-76 implied-volatility inversion. The caller supplies a bracket
//! known (or required) to contain a sign change; Newton steps are taken
//! while they stay inside the bracket and bisection takes over whenever a
//! step escapes it or the derivative degenerates, so the iteration cannot
//! diverge.

use crate::types::error::SolverError;

/// Derivative magnitude below which a Newton step is considered unusable.
const MIN_DERIVATIVE: f64 = 1e-14;

/// Safeguarded Newton-Raphson solver on a bracketing interval.
///
/// # Example
///
/// ```
/// use swaphedge_core::math::solvers::BracketedNewtonSolver;
///
/// let solver = BracketedNewtonSolver::default();
/// let root = solver
///     .find_root(|x| x * x - 2.0, |x| 2.0 * x, 1.0, 0.0, 2.0)
///     .unwrap();
/// assert!((root - 2.0_f64.sqrt()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketedNewtonSolver {
    tolerance: f64,
    max_iterations: usize,
}

impl Default for BracketedNewtonSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }
}

impl BracketedNewtonSolver {
    /// Creates a solver with the given tolerance and iteration cap.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Convergence tolerance on `|f(x)|` and on the bracket width.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Finds a root of `f` in `[lo, hi]` starting from `guess`.
    ///
    /// # Errors
    ///
    /// - [`SolverError::NoBracket`] when `f(lo)` and `f(hi)` share a sign
    /// - [`SolverError::RootFindFailure`] when the iteration budget runs out
    pub fn find_root<F, D>(
        &self,
        f: F,
        df: D,
        guess: f64,
        lo: f64,
        hi: f64,
    ) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

        let f_lo = f(lo);
        if f_lo.abs() < self.tolerance {
            return Ok(lo);
        }
        let f_hi = f(hi);
        if f_hi.abs() < self.tolerance {
            return Ok(hi);
        }
        if f_lo.signum() == f_hi.signum() {
            return Err(SolverError::NoBracket { lo, hi });
        }

        // Orient so that f(lo) < 0 < f(hi)
        if f_lo > 0.0 {
            std::mem::swap(&mut lo, &mut hi);
        }

        let mut x = guess.clamp(lo.min(hi), lo.max(hi));

        for _iteration in 0..self.max_iterations {
            let fx = f(x);
            if !fx.is_finite() {
                // Retreat to the midpoint of the current bracket
                x = 0.5 * (lo + hi);
                continue;
            }
            if fx.abs() < self.tolerance {
                return Ok(x);
            }

            if fx < 0.0 {
                lo = x;
            } else {
                hi = x;
            }
            if (hi - lo).abs() < self.tolerance {
                return Ok(0.5 * (lo + hi));
            }

            let dfx = df(x);
            let newton_x = x - fx / dfx;
            let in_bracket = newton_x > lo.min(hi) && newton_x < lo.max(hi);

            x = if dfx.abs() > MIN_DERIVATIVE && newton_x.is_finite() && in_bracket {
                newton_x
            } else {
                0.5 * (lo + hi)
            };
        }

        Err(SolverError::RootFindFailure {
            iterations: self.max_iterations,
            last_x: x,
        })
    }
}

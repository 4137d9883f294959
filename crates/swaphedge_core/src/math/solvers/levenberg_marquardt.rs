//! Levenberg-Marquardt non-linear least squares.
//!
//! Minimizes `sum(r_i(p)^2)` over parameters `p` for a caller-supplied
//! residual function, using a finite-difference Jacobian and a damped
//! Gauss-Newton step solved through Cholesky factorization of the normal
//! equations.
//!
//! The stopping rule mirrors the usual end-criteria triple: a function
//! tolerance on the residual-sum improvement, a gradient tolerance, a
//! parameter-step tolerance, plus caps on total iterations and on
//! consecutive stationary (non-improving) iterations. Hitting the
//! stationary cap means a local minimum was reached and counts as
//! convergence; exhausting the total iteration budget does not.

use tracing::debug;

use crate::types::error::SolverError;

/// Relative step for the forward-difference Jacobian. Residual functions
/// often run inner root-finds with tolerances near 1e-12, so the bump must
/// produce residual deltas well above that noise floor; a 1e-8 step does
/// not.
const JACOBIAN_STEP: f64 = 1e-6;

/// Configuration for the Levenberg-Marquardt solver.
///
/// Defaults match the calibration end criteria used throughout the engine:
/// 400 iterations, 100 stationary iterations, tolerances of 1e-8.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMConfig {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Maximum number of consecutive non-improving iterations before the
    /// current iterate is declared a stationary point.
    pub max_stationary_iterations: usize,
    /// Relative tolerance on the residual-sum improvement.
    pub function_tolerance: f64,
    /// Tolerance on the infinity norm of the gradient `J^T r`.
    pub gradient_tolerance: f64,
    /// Relative tolerance on the parameter step.
    pub param_tolerance: f64,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Damping multiplier after a rejected step.
    pub lambda_up: f64,
    /// Damping multiplier after an accepted step.
    pub lambda_down: f64,
    /// Damping ceiling; exceeding it ends the search at the current iterate.
    pub max_lambda: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            max_stationary_iterations: 100,
            function_tolerance: 1e-8,
            gradient_tolerance: 1e-8,
            param_tolerance: 1e-8,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            max_lambda: 1e10,
        }
    }
}

impl LMConfig {
    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the stationary-iteration cap.
    pub fn with_max_stationary_iterations(mut self, max_stationary: usize) -> Self {
        self.max_stationary_iterations = max_stationary;
        self
    }

    /// Sets all three tolerances (function, gradient, parameter) at once.
    pub fn with_tolerances(mut self, tolerance: f64) -> Self {
        self.function_tolerance = tolerance;
        self.gradient_tolerance = tolerance;
        self.param_tolerance = tolerance;
        self
    }
}

/// Result of a Levenberg-Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Final parameter values.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a stopping tolerance (or a stationary point) was reached
    /// before the iteration cap.
    pub converged: bool,
    /// Damping factor at termination.
    pub final_lambda: f64,
}

/// Damped least-squares solver.
///
/// # Example
///
/// ```
/// use swaphedge_core::math::solvers::{LMConfig, LevenbergMarquardtSolver};
///
/// // Fit y = a * exp(-b * x) to noiseless samples of 2 * exp(-0.5 x)
/// let xs = [0.0_f64, 1.0, 2.0, 3.0];
/// let ys: Vec<f64> = xs.iter().map(|x| 2.0 * (-0.5 * x).exp()).collect();
///
/// let solver = LevenbergMarquardtSolver::new(LMConfig::default());
/// let result = solver
///     .solve(
///         |p| xs.iter().zip(&ys).map(|(x, y)| p[0] * (-p[1] * x).exp() - y).collect(),
///         vec![1.0, 1.0],
///     )
///     .unwrap();
///
/// assert!(result.converged);
/// assert!((result.params[0] - 2.0).abs() < 1e-5);
/// assert!((result.params[1] - 0.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// The solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Minimizes the residual sum of squares starting from `initial`.
    ///
    /// `residual_fn` must return the same number of residuals on every call;
    /// at least as many residuals as parameters are required for the normal
    /// equations to be determined.
    pub fn solve<F>(&self, residual_fn: F, initial: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n_params = initial.len();
        let mut params = initial;
        let mut residuals = residual_fn(&params);
        let n_res = residuals.len();
        if n_res < n_params {
            return Err(SolverError::InvalidDimension {
                expected: n_params,
                actual: n_res,
            });
        }

        let mut ss = sum_of_squares(&residuals);
        let mut lambda = self.config.initial_lambda;
        let mut stationary = 0_usize;
        let mut iterations = 0_usize;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let jacobian = self.compute_jacobian(&residual_fn, &params, &residuals, n_res)?;

            // Gradient g = J^T r and normal matrix J^T J
            let gradient = jt_r(&jacobian, &residuals, n_params);
            let jtj = jt_j(&jacobian, n_params);

            let grad_norm = gradient.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
            if grad_norm < self.config.gradient_tolerance {
                debug!(iterations, grad_norm, "gradient tolerance reached");
                return Ok(self.finish(params, ss, iterations, true, lambda));
            }

            // Damped normal equations: (J^T J + lambda I) delta = -g
            let mut damped = jtj.clone();
            for (i, row) in damped.iter_mut().enumerate() {
                row[i] += lambda;
            }
            let delta = match solve_cholesky(&damped, &gradient) {
                Ok(mut d) => {
                    for x in &mut d {
                        *x = -*x;
                    }
                    d
                }
                Err(_) => {
                    lambda *= self.config.lambda_up;
                    if lambda > self.config.max_lambda {
                        return Ok(self.finish(params, ss, iterations, true, lambda));
                    }
                    continue;
                }
            };

            let trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let trial_residuals = residual_fn(&trial);
            if trial_residuals.len() != n_res {
                return Err(SolverError::InvalidDimension {
                    expected: n_res,
                    actual: trial_residuals.len(),
                });
            }
            let trial_ss = sum_of_squares(&trial_residuals);

            if trial_ss.is_finite() && trial_ss < ss {
                let improvement = ss - trial_ss;
                let step_norm = delta
                    .iter()
                    .zip(&params)
                    .fold(0.0_f64, |m, (d, p)| m.max(d.abs() / p.abs().max(1.0)));

                params = trial;
                residuals = trial_residuals;
                ss = trial_ss;
                lambda = (lambda * self.config.lambda_down).max(1e-12);
                stationary = 0;

                debug!(iterations, ss, lambda, "step accepted");

                if improvement < self.config.function_tolerance * (1.0 + ss) {
                    return Ok(self.finish(params, ss, iterations, true, lambda));
                }
                if step_norm < self.config.param_tolerance {
                    return Ok(self.finish(params, ss, iterations, true, lambda));
                }
            } else {
                stationary += 1;
                lambda *= self.config.lambda_up;
                debug!(iterations, trial_ss, lambda, stationary, "step rejected");

                if stationary >= self.config.max_stationary_iterations
                    || lambda > self.config.max_lambda
                {
                    // No descent direction left: current iterate is a
                    // stationary point of the objective.
                    return Ok(self.finish(params, ss, iterations, true, lambda));
                }
            }
        }

        // Budget exhausted; the caller treats this as a soft failure.
        Ok(self.finish(params, ss, iterations, false, lambda))
    }

    fn finish(
        &self,
        params: Vec<f64>,
        residual_ss: f64,
        iterations: usize,
        converged: bool,
        final_lambda: f64,
    ) -> LMResult {
        LMResult {
            params,
            residual_ss,
            iterations,
            converged,
            final_lambda,
        }
    }

    /// Forward-difference Jacobian, one residual evaluation per parameter.
    fn compute_jacobian<F>(
        &self,
        residual_fn: &F,
        params: &[f64],
        residuals: &[f64],
        n_res: usize,
    ) -> Result<Vec<Vec<f64>>, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n_params = params.len();
        let mut jacobian = vec![vec![0.0; n_params]; n_res];
        let mut bumped = params.to_vec();

        for j in 0..n_params {
            let h = JACOBIAN_STEP * params[j].abs().max(1.0);
            bumped[j] = params[j] + h;
            let shifted = residual_fn(&bumped);
            bumped[j] = params[j];

            if shifted.len() != n_res {
                return Err(SolverError::InvalidDimension {
                    expected: n_res,
                    actual: shifted.len(),
                });
            }
            for i in 0..n_res {
                jacobian[i][j] = (shifted[i] - residuals[i]) / h;
            }
        }
        Ok(jacobian)
    }
}

fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

fn jt_r(jacobian: &[Vec<f64>], residuals: &[f64], n_params: usize) -> Vec<f64> {
    let mut g = vec![0.0; n_params];
    for (row, r) in jacobian.iter().zip(residuals) {
        for (gj, jij) in g.iter_mut().zip(row) {
            *gj += jij * r;
        }
    }
    g
}

fn jt_j(jacobian: &[Vec<f64>], n_params: usize) -> Vec<Vec<f64>> {
    let mut m = vec![vec![0.0; n_params]; n_params];
    for row in jacobian {
        for i in 0..n_params {
            for j in i..n_params {
                m[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n_params {
        for j in 0..i {
            m[i][j] = m[j][i];
        }
    }
    m
}

/// Solves `A x = b` for symmetric positive-definite `A` via Cholesky.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>, SolverError> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(SolverError::NonPositiveDefinite);
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }

    // Back substitution: L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==========================================================
    // Cholesky tests
    // ==========================================================

    #[test]
    fn test_cholesky_identity() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let b = vec![3.0, 4.0];
        let x = solve_cholesky(&a, &b).unwrap();
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_spd_system() {
        // A = [[4, 2], [2, 3]], b = [10, 8] -> x = [1.75, 1.5]
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let b = vec![10.0, 8.0];
        let x = solve_cholesky(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.75, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        let b = vec![1.0, 1.0];
        assert_eq!(
            solve_cholesky(&a, &b).unwrap_err(),
            SolverError::NonPositiveDefinite
        );
    }

    // ==========================================================
    // Solver tests
    // ==========================================================

    #[test]
    fn test_solve_linear_system() {
        let solver = LevenbergMarquardtSolver::default();
        let result = solver
            .solve(|p| vec![p[0] - 2.0, p[1] - 3.0], vec![0.0, 0.0])
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.params[1], 3.0, epsilon = 1e-6);
        assert!(result.residual_ss < 1e-10);
    }

    #[test]
    fn test_solve_exponential_fit() {
        let xs: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 1.5 * (-0.8 * x).exp()).collect();

        let solver = LevenbergMarquardtSolver::default();
        let residuals = |p: &[f64]| -> Vec<f64> {
            xs.iter()
                .zip(&ys)
                .map(|(x, y)| p[0] * (-p[1] * x).exp() - y)
                .collect()
        };

        let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.params[0], 1.5, epsilon = 1e-4);
        assert_relative_eq!(result.params[1], 0.8, epsilon = 1e-4);
    }

    #[test]
    fn test_overdetermined_rosenbrock_valley() {
        // Rosenbrock residuals: r1 = 10(y - x^2), r2 = 1 - x
        let solver = LevenbergMarquardtSolver::new(
            LMConfig::default().with_max_iterations(2000),
        );
        let result = solver
            .solve(
                |p| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]],
                vec![-1.2, 1.0],
            )
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_iteration_cap_is_soft_failure() {
        let config = LMConfig::default().with_max_iterations(2);
        let solver = LevenbergMarquardtSolver::new(config);
        let result = solver
            .solve(
                |p| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]],
                vec![-1.2, 1.0],
            )
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
        // Best-effort parameters are still returned
        assert_eq!(result.params.len(), 2);
    }

    #[test]
    fn test_converges_through_residual_noise_floor() {
        // Residuals carry a tiny high-frequency jitter, standing in for
        // the tolerance of an inner root-find. The Jacobian bump must be
        // large enough that the jitter does not swamp the finite
        // differences.
        let xs: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 1.5 * (-0.8 * x).exp()).collect();

        let solver = LevenbergMarquardtSolver::default();
        let residuals = |p: &[f64]| -> Vec<f64> {
            xs.iter()
                .zip(&ys)
                .enumerate()
                .map(|(i, (x, y))| {
                    let jitter = 1e-9 * (1e7 * (p[0] + p[1]) * (i + 1) as f64).sin();
                    p[0] * (-p[1] * x).exp() - y + jitter
                })
                .collect()
        };

        let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.params[0], 1.5, epsilon = 1e-3);
        assert_relative_eq!(result.params[1], 0.8, epsilon = 1e-3);
    }

    #[test]
    fn test_underdetermined_rejected() {
        let solver = LevenbergMarquardtSolver::default();
        let result = solver.solve(|p| vec![p[0] + p[1]], vec![0.0, 0.0]);
        assert!(matches!(
            result,
            Err(SolverError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_already_at_minimum() {
        let solver = LevenbergMarquardtSolver::default();
        let result = solver
            .solve(|p| vec![p[0] - 1.0, p[1] + 2.0], vec![1.0, -2.0])
            .unwrap();
        assert!(result.converged);
        assert!(result.residual_ss < 1e-15);
    }

    #[test]
    fn test_config_builders() {
        let config = LMConfig::default()
            .with_max_iterations(50)
            .with_max_stationary_iterations(10)
            .with_tolerances(1e-10);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.max_stationary_iterations, 10);
        assert_eq!(config.function_tolerance, 1e-10);
        assert_eq!(config.gradient_tolerance, 1e-10);
        assert_eq!(config.param_tolerance, 1e-10);
    }
}

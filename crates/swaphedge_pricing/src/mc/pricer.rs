//! Monte Carlo European swaption pricer.

use rayon::prelude::*;
use tracing::debug;

use swaphedge_core::market_data::curves::YieldCurve;
use swaphedge_models::error::ScheduleError;
use swaphedge_models::instruments::Swaption;
use swaphedge_models::HullWhite;

use crate::error::SimulationError;
use crate::rng::PathRng;

use super::MonteCarloConfig;

/// Annuities below this are treated as a degenerate path rather than fed
/// into the swap-rate division.
const MIN_ANNUITY: f64 = 1e-12;

/// Result of a Monte Carlo pricing run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct McResult {
    /// Estimated net present value.
    pub npv: f64,
    /// Standard error of the estimate.
    pub std_error: f64,
    /// Paths requested.
    pub n_paths: usize,
    /// Paths discarded as degenerate.
    pub degenerate_paths: usize,
}

/// Monte Carlo pricer for European swaptions under Hull-White.
///
/// The factor is carried from today to expiry in a single exact step, so
/// path count rather than step count controls accuracy. Each path has its
/// own generator seeded as `base_seed + path_index`, and the payoffs are
/// reduced in path order after the parallel map, which makes the estimate
/// bit-identical across thread counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonteCarloPricer {
    config: MonteCarloConfig,
}

impl MonteCarloPricer {
    /// Creates a pricer with the given configuration.
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// The pricer configuration.
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Prices a European swaption by simulation.
    ///
    /// The swaption must exercise at the swap start. Paths whose sampled
    /// state produces a non-finite or non-positive annuity are discarded;
    /// the run fails with [`SimulationError::DegeneratePath`] when more
    /// than the configured fraction is lost.
    pub fn price<C>(
        &self,
        model: &HullWhite<C>,
        swaption: &Swaption<f64>,
    ) -> Result<McResult, SimulationError>
    where
        C: YieldCurve<f64> + Send + Sync,
    {
        self.config.validate()?;

        let swap = swaption.swap();
        let expiry = swaption.expiry();
        if (expiry - swap.start()).abs() > 1e-12 {
            return Err(map_schedule(format!(
                "simulation requires exercise at swap start (expiry {expiry}, start {})",
                swap.start()
            )));
        }

        // Everything curve-dependent is precomputed once; the per-path
        // work is pure arithmetic on the sampled factor.
        let x0 = model.short_rate_at_zero()?;
        let df_expiry = model.curve().discount_factor(expiry)?;

        let mut coefficients = Vec::with_capacity(swap.fixed_payment_times().len());
        for time in swap.fixed_payment_times() {
            coefficients.push(model.bond_coefficients(expiry, *time)?);
        }
        let accruals = swap.fixed_accruals();
        let (end_ln_a, end_b) = *coefficients
            .last()
            .ok_or_else(|| map_schedule("swap has no fixed payments"))?;

        let strike = swap.fixed_rate();
        let sign = swap.direction().payoff_sign::<f64>();
        let notional = swap.notional();
        let seed = self.config.seed();

        let payoffs: Vec<Option<f64>> = (0..self.config.n_paths())
            .into_par_iter()
            .map(|i| {
                let mut rng = PathRng::from_seed(seed.wrapping_add(i as u64));
                let dw = rng.standard_normal();
                let x = model.evolve(0.0, x0, expiry, dw).ok()?;

                let mut annuity = 0.0;
                for ((ln_a, b), tau) in coefficients.iter().zip(accruals) {
                    annuity += tau * (ln_a - b * x).exp();
                }
                if !annuity.is_finite() || annuity < MIN_ANNUITY {
                    return None;
                }

                let bond_to_end = (end_ln_a - end_b * x).exp();
                let swap_rate = (1.0 - bond_to_end) / annuity;
                let intrinsic = (sign * (swap_rate - strike)).max(0.0);
                Some(intrinsic * annuity * df_expiry * notional)
            })
            .collect();

        // Sequential reduction in path order keeps the sum bit-identical
        // regardless of how rayon partitioned the map.
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut degenerate = 0usize;
        for payoff in &payoffs {
            match payoff {
                Some(value) => {
                    sum += value;
                    sum_sq += value * value;
                }
                None => degenerate += 1,
            }
        }

        let total = self.config.n_paths();
        let used = total - degenerate;
        if used == 0
            || degenerate as f64 > self.config.max_degenerate_fraction() * total as f64
        {
            return Err(SimulationError::DegeneratePath {
                excluded: degenerate,
                total,
            });
        }

        let n = used as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);
        let std_error = (variance / n).sqrt();

        debug!(
            npv = mean,
            std_error,
            n_paths = total,
            degenerate,
            seed,
            "monte carlo run complete"
        );

        Ok(McResult {
            npv: mean,
            std_error,
            n_paths: total,
            degenerate_paths: degenerate,
        })
    }
}

fn map_schedule(reason: impl Into<String>) -> SimulationError {
    let err = ScheduleError::InvalidSchedule {
        reason: reason.into(),
    };
    SimulationError::Pricing(err.into())
}

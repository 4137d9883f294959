//! Least-squares calibration engine.
//!
//! Fits `(a, sigma)` to a set of swaption quotes by Levenberg-Marquardt on
//! price residuals `model - market`, where the market price is the
//! Black-76 price at the quoted volatility and ATM forward strike, and the
//! model price is the Jamshidian analytic price under the trial
//! parameters.
//!
//! An optional outlier-robust refit drops instruments whose relative price
//! error after the first fit exceeds a cutoff derived from the observed
//! error distribution, then refits on the survivors. The filter is
//! mark-then-compact: exclusions are flagged on the full set first and the
//! surviving subset is built as a fresh vector.

use std::sync::Arc;

use tracing::{debug, info, warn};

use swaphedge_core::market_data::curves::YieldCurve;
use swaphedge_core::math::solvers::{LMConfig, LMResult, LevenbergMarquardtSolver};

use crate::analytical::black76::black76_swaption_price;
use crate::analytical::implied_vol::ImpliedVolatilitySolver;
use crate::analytical::jamshidian::price_swaption_jamshidian;
use crate::error::CalibrationError;
use crate::instruments::swap::{InterestRateSwap, SwapDirection};
use crate::instruments::swaption::Swaption;
use crate::models::hull_white::HullWhite;

use super::result::{CalibrationOutcome, InstrumentDiagnostic, ModelParameters};
use super::surface::SwaptionQuote;

/// Residual substituted when a trial point cannot be priced; steers the
/// optimizer back into the feasible region.
const PENALTY_RESIDUAL: f64 = 1e6;

/// Placeholder coupon used to build schedules before striking at par.
const SCHEDULE_RATE: f64 = 0.03;

/// Closed parameter interval with clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    /// Lower bound (inclusive).
    pub lower: f64,
    /// Upper bound (inclusive).
    pub upper: f64,
}

impl ParameterBounds {
    /// Creates bounds; callers must pass `lower <= upper`.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Clamps a value into the interval.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// Calibration configuration.
///
/// Defaults: 400 iterations, 100 stationary iterations, tolerances 1e-8,
/// initial guess `(a, sigma) = (0.1, 0.01)`, positivity enforced through
/// clamping bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Optimizer settings.
    pub lm: LMConfig,
    /// Starting parameters.
    pub initial: ModelParameters,
    /// Bounds on the mean-reversion speed.
    pub mean_reversion_bounds: ParameterBounds,
    /// Bounds on the short-rate volatility.
    pub volatility_bounds: ParameterBounds,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            lm: LMConfig::default(),
            initial: ModelParameters {
                mean_reversion: 0.1,
                volatility: 0.01,
            },
            mean_reversion_bounds: ParameterBounds::new(1e-4, 5.0),
            volatility_bounds: ParameterBounds::new(1e-6, 2.0),
        }
    }
}

impl CalibrationConfig {
    /// Sets the optimizer configuration.
    pub fn with_lm(mut self, lm: LMConfig) -> Self {
        self.lm = lm;
        self
    }

    /// Sets the initial parameter guess.
    pub fn with_initial(mut self, mean_reversion: f64, volatility: f64) -> Self {
        self.initial = ModelParameters {
            mean_reversion,
            volatility,
        };
        self
    }
}

/// Outlier exclusion rule for the refit pass.
///
/// The cutoff is `multiplier` times the `quantile` of the observed
/// relative price errors after the first fit; instruments above it are
/// dropped and the model refitted on the rest. The first fit is itself
/// pulled toward any mispriced cell, which compresses the gap between
/// its error and the rest of the distribution, so the default multiplier
/// is deliberately modest. Errors below `min_error` never trigger
/// exclusion regardless of the distribution, so a uniformly excellent
/// fit is left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierPolicy {
    /// Quantile of the error distribution the cutoff is anchored to.
    pub quantile: f64,
    /// Multiplier applied to the quantile value.
    pub multiplier: f64,
    /// Absolute error floor below which nothing is excluded.
    pub min_error: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            quantile: 0.5,
            multiplier: 1.5,
            min_error: 1e-3,
        }
    }
}

impl OutlierPolicy {
    /// Exclusion cutoff for an observed error sample.
    fn cutoff(&self, errors: &[f64]) -> f64 {
        let mut sorted: Vec<f64> = errors.iter().copied().filter(|e| e.is_finite()).collect();
        if sorted.is_empty() {
            return f64::INFINITY;
        }
        sorted.sort_by(|x, y| x.total_cmp(y));
        let idx = ((sorted.len() - 1) as f64 * self.quantile).round() as usize;
        self.multiplier * sorted[idx]
    }
}

/// One prepared calibration instrument: an ATM swaption cell with its
/// Black-76 market price.
#[derive(Debug, Clone)]
struct CalibrationInstrument {
    quote: SwaptionQuote,
    swaption: Swaption<f64>,
    market_price: f64,
    forward: f64,
    annuity: f64,
}

/// Hull-White calibration engine.
///
/// Stateless between runs: each call prices against the curve it is
/// handed, so engines can be shared across valuation dates.
#[derive(Debug, Clone, Default)]
pub struct CalibrationEngine {
    config: CalibrationConfig,
}

impl CalibrationEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrates `(a, sigma)` to the quotes, optionally with the
    /// outlier-robust refit pass.
    ///
    /// Non-convergence is a soft failure: the outcome carries the best
    /// parameters found with `converged == false`. Hard errors are
    /// reserved for unusable input.
    pub fn calibrate<C: YieldCurve<f64>>(
        &self,
        curve: &Arc<C>,
        quotes: &[SwaptionQuote],
        outliers: Option<&OutlierPolicy>,
    ) -> Result<CalibrationOutcome, CalibrationError> {
        let instruments = self.setup_instruments(curve, quotes)?;
        if instruments.is_empty() {
            return Err(CalibrationError::NoInstruments {
                supplied: quotes.len(),
                usable: 0,
            });
        }

        let first = self.fit(curve, &instruments)?;
        let first_params = self.clamped(&first.params);
        debug!(
            a = first_params.mean_reversion,
            sigma = first_params.volatility,
            residual_ss = first.residual_ss,
            "first calibration pass complete"
        );

        let mut excluded = vec![false; instruments.len()];
        let mut final_fit = first;

        if let Some(policy) = outliers {
            let model = self.build_model(curve, first_params)?;
            let errors: Vec<f64> = instruments
                .iter()
                .map(|inst| relative_price_error(&model, inst))
                .collect();
            let cutoff = policy.cutoff(&errors);

            // Mark first; compact into a fresh vector afterwards. Erasing
            // from the live collection while scanning it would skip the
            // element after each removal.
            for (flag, err) in excluded.iter_mut().zip(&errors) {
                *flag = *err > cutoff && *err > policy.min_error;
            }
            let survivors: Vec<CalibrationInstrument> = instruments
                .iter()
                .zip(&excluded)
                .filter(|(_, dropped)| !**dropped)
                .map(|(inst, _)| inst.clone())
                .collect();

            let n_excluded = instruments.len() - survivors.len();
            if n_excluded > 0 && survivors.len() >= 2 {
                for (inst, err) in instruments.iter().zip(&errors) {
                    if *err > cutoff && *err > policy.min_error {
                        info!(
                            maturity = inst.quote.maturity_years,
                            tenor = inst.quote.tenor_years,
                            relative_price_error = err,
                            cutoff,
                            "excluding outlier instrument from refit"
                        );
                    }
                }
                final_fit = self.fit(curve, &survivors)?;
            } else if n_excluded > 0 {
                warn!(
                    n_excluded,
                    remaining = survivors.len(),
                    "outlier filter left too few instruments; keeping first fit"
                );
                excluded.iter_mut().for_each(|flag| *flag = false);
            }
        }

        let params = self.clamped(&final_fit.params);
        if !final_fit.converged {
            warn!(
                iterations = final_fit.iterations,
                residual_ss = final_fit.residual_ss,
                "calibration did not converge; returning best-effort parameters"
            );
        }

        let model = self.build_model(curve, params)?;
        let diagnostics: Vec<InstrumentDiagnostic> = instruments
            .iter()
            .zip(&excluded)
            .map(|(inst, dropped)| self.diagnose(&model, inst, *dropped))
            .collect();

        Ok(CalibrationOutcome {
            params,
            converged: final_fit.converged,
            iterations: final_fit.iterations,
            residual_ss: final_fit.residual_ss,
            diagnostics,
        })
    }

    /// Builds ATM swaptions and market prices for each quote.
    fn setup_instruments<C: YieldCurve<f64>>(
        &self,
        curve: &Arc<C>,
        quotes: &[SwaptionQuote],
    ) -> Result<Vec<CalibrationInstrument>, CalibrationError> {
        quotes
            .iter()
            .map(|quote| {
                self.setup_one(curve, quote).map_err(|source| {
                    CalibrationError::InstrumentSetup {
                        maturity_years: quote.maturity_years,
                        tenor_years: quote.tenor_years,
                        source,
                    }
                })
            })
            .collect()
    }

    fn setup_one<C: YieldCurve<f64>>(
        &self,
        curve: &Arc<C>,
        quote: &SwaptionQuote,
    ) -> Result<CalibrationInstrument, crate::error::PricingError> {
        let swap = InterestRateSwap::forward_starting(
            SwapDirection::Payer,
            1.0,
            SCHEDULE_RATE,
            quote.maturity_years,
            quote.tenor_years,
        )?;
        let forward = swap.par_rate(curve.as_ref())?;
        let annuity = swap.annuity(curve.as_ref())?;
        let swaption = Swaption::at_swap_start(swap.with_fixed_rate(forward))?;

        let market_price = black76_swaption_price(
            SwapDirection::Payer,
            forward,
            forward,
            quote.market_vol,
            quote.maturity_years,
            annuity,
        )?;

        Ok(CalibrationInstrument {
            quote: *quote,
            swaption,
            market_price,
            forward,
            annuity,
        })
    }

    /// One Levenberg-Marquardt pass over the active instruments.
    fn fit<C: YieldCurve<f64>>(
        &self,
        curve: &Arc<C>,
        instruments: &[CalibrationInstrument],
    ) -> Result<LMResult, CalibrationError> {
        let residual_fn = |p: &[f64]| -> Vec<f64> {
            let a = self.config.mean_reversion_bounds.clamp(p[0]);
            let sigma = self.config.volatility_bounds.clamp(p[1]);
            match HullWhite::new(a, sigma, curve.clone()) {
                Ok(model) => instruments
                    .iter()
                    .map(|inst| {
                        price_swaption_jamshidian(&model, &inst.swaption)
                            .map(|price| price - inst.market_price)
                            .unwrap_or(PENALTY_RESIDUAL)
                    })
                    .collect(),
                Err(_) => vec![PENALTY_RESIDUAL; instruments.len()],
            }
        };

        let solver = LevenbergMarquardtSolver::new(self.config.lm);
        let initial = vec![
            self.config.initial.mean_reversion,
            self.config.initial.volatility,
        ];
        Ok(solver.solve(residual_fn, initial)?)
    }

    fn clamped(&self, params: &[f64]) -> ModelParameters {
        ModelParameters {
            mean_reversion: self.config.mean_reversion_bounds.clamp(params[0]),
            volatility: self.config.volatility_bounds.clamp(params[1]),
        }
    }

    fn build_model<C: YieldCurve<f64>>(
        &self,
        curve: &Arc<C>,
        params: ModelParameters,
    ) -> Result<HullWhite<C>, CalibrationError> {
        HullWhite::new(params.mean_reversion, params.volatility, curve.clone()).map_err(|_| {
            // Bounds keep parameters strictly positive, so this is
            // unreachable on any clamped input.
            CalibrationError::NoInstruments {
                supplied: 0,
                usable: 0,
            }
        })
    }

    fn diagnose<C: YieldCurve<f64>>(
        &self,
        model: &HullWhite<C>,
        inst: &CalibrationInstrument,
        excluded: bool,
    ) -> InstrumentDiagnostic {
        let price_error = relative_price_error(model, inst);

        let vol_error = match price_swaption_jamshidian(model, &inst.swaption) {
            Ok(model_price) => ImpliedVolatilitySolver::default()
                .with_guess(inst.quote.market_vol)
                .solve(
                    model_price,
                    SwapDirection::Payer,
                    inst.forward,
                    inst.forward,
                    inst.quote.maturity_years,
                    inst.annuity,
                )
                .map(|iv| (iv - inst.quote.market_vol).abs() / inst.quote.market_vol)
                .unwrap_or_else(|err| {
                    warn!(
                        maturity = inst.quote.maturity_years,
                        tenor = inst.quote.tenor_years,
                        %err,
                        "implied-vol inversion failed in diagnostics"
                    );
                    f64::NAN
                }),
            Err(_) => f64::NAN,
        };

        InstrumentDiagnostic {
            maturity_years: inst.quote.maturity_years,
            tenor_years: inst.quote.tenor_years,
            relative_vol_error: vol_error,
            relative_price_error: price_error,
            excluded,
        }
    }
}

fn relative_price_error<C: YieldCurve<f64>>(
    model: &HullWhite<C>,
    inst: &CalibrationInstrument,
) -> f64 {
    match price_swaption_jamshidian(model, &inst.swaption) {
        Ok(price) => (price - inst.market_price).abs() / inst.market_price,
        Err(_) => f64::INFINITY,
    }
}

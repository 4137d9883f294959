//! Hull-White (extended Vasicek) one-factor short-rate model.
//!
//! ```text
//! dr = (theta(t) - a * r) dt + sigma dW
//! ```
//!
//! `theta(t)` is fitted to the reference curve so the model reproduces
//! today's discount factors exactly. The model exposes the two primitives
//! the pricing engines need:
//!
//! - [`HullWhite::discount_bond`]: the affine closed form
//!   `P(t, T) = A(t, T) exp(-B(t, T) x)`
//! - [`HullWhite::evolve`]: the exact one-step transition of the short rate,
//!   the only stochastic primitive in the system

use std::sync::Arc;

use swaphedge_core::market_data::curves::YieldCurve;
use swaphedge_core::types::error::CurveError;

use crate::analytical::distributions::norm_cdf;
use crate::error::ModelError;

/// Mean-reversion speed below which the `a -> 0` limits are used to avoid
/// catastrophic cancellation.
const A_TINY: f64 = 1e-10;

/// Bond-option flavour for [`HullWhite::discount_bond_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOptionType {
    /// Right to buy the bond at the strike.
    Call,
    /// Right to sell the bond at the strike.
    Put,
}

/// Curve-fitted Hull-White model.
///
/// The curve is shared through an `Arc` so calibration can rebuild models
/// for trial parameters without cloning curve data.
#[derive(Debug, Clone)]
pub struct HullWhite<C> {
    a: f64,
    sigma: f64,
    curve: Arc<C>,
}

impl<C: YieldCurve<f64>> HullWhite<C> {
    /// Creates a model, rejecting non-positive or non-finite parameters.
    pub fn new(a: f64, sigma: f64, curve: Arc<C>) -> Result<Self, ModelError> {
        if !(a.is_finite() && sigma.is_finite()) || a <= 0.0 || sigma <= 0.0 {
            return Err(ModelError::InvalidParameters { a, sigma });
        }
        Ok(Self { a, sigma, curve })
    }

    /// Mean-reversion speed.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Short-rate volatility.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// The reference curve.
    pub fn curve(&self) -> &Arc<C> {
        &self.curve
    }

    /// Curve-implied short rate at time zero, the simulation start state.
    pub fn short_rate_at_zero(&self) -> Result<f64, CurveError> {
        self.curve.instantaneous_forward(0.0)
    }

    /// `B(t, T) = (1 - e^{-a (T - t)}) / a`.
    pub fn b_factor(&self, t: f64, maturity: f64) -> f64 {
        let dt = maturity - t;
        if self.a < A_TINY {
            dt
        } else {
            (1.0 - (-self.a * dt).exp()) / self.a
        }
    }

    /// Affine coefficients `(ln A(t, T), B(t, T))` of the bond formula
    /// `P(t, T) = exp(ln A - B x)`.
    ///
    /// Exposed so root-finds over the short rate can pre-compute the
    /// curve-dependent part once and evaluate bond prices as a pure
    /// function of `x`.
    pub fn bond_coefficients(&self, t: f64, maturity: f64) -> Result<(f64, f64), CurveError> {
        let b = self.b_factor(t, maturity);
        let p0_t = self.curve.discount_factor(t)?;
        let p0_mat = self.curve.discount_factor(maturity)?;
        let f0_t = self.curve.instantaneous_forward(t)?;

        let variance_term = if self.a < A_TINY {
            self.sigma * self.sigma * t * b * b / 2.0
        } else {
            self.sigma * self.sigma / (4.0 * self.a)
                * (1.0 - (-2.0 * self.a * t).exp())
                * b
                * b
        };
        let ln_a = (p0_mat / p0_t).ln() + b * f0_t - variance_term;
        Ok((ln_a, b))
    }

    /// Zero-coupon bond price `P(t, T)` given short rate `x` at `t`.
    ///
    /// Consistent with the reference curve: at `t = 0` with
    /// `x = f(0, 0)` this reproduces `curve.discount_factor(T)`.
    pub fn discount_bond(&self, t: f64, maturity: f64, x: f64) -> Result<f64, CurveError> {
        let (ln_a, b) = self.bond_coefficients(t, maturity)?;
        Ok((ln_a - b * x).exp())
    }

    /// Deterministic shift between the short rate and the driftless OU
    /// factor: `alpha(t) = f(0, t) + sigma^2 B(0, t)^2 / 2`.
    ///
    /// The fitted short rate is `r(t) = y(t) + alpha(t)` with `y` a
    /// zero-mean OU process, so transition means reduce to differences of
    /// `alpha` and never need the forward-curve slope.
    pub fn alpha(&self, t: f64) -> Result<f64, CurveError> {
        let b = self.b_factor(0.0, t);
        let f0_t = self.curve.instantaneous_forward(t)?;
        Ok(f0_t + 0.5 * self.sigma * self.sigma * b * b)
    }

    /// Evolves the short rate one step from `t` to `t + dt`.
    ///
    /// Exact conditional moments of the OU transition are used (not an
    /// Euler step): mean
    /// `x e^{-a dt} + alpha(t + dt) - alpha(t) e^{-a dt}`, standard
    /// deviation `sigma sqrt((1 - e^{-2a dt}) / (2a))`. Deterministic
    /// steps compose exactly, so one long step equals any refinement of
    /// it. `dw` is a standard normal draw; all randomness funnels through
    /// it.
    pub fn evolve(&self, t: f64, x: f64, dt: f64, dw: f64) -> Result<f64, CurveError> {
        let alpha_from = self.alpha(t)?;
        let alpha_to = self.alpha(t + dt)?;

        let (mean, std_dev) = if self.a < A_TINY {
            (x + alpha_to - alpha_from, self.sigma * dt.sqrt())
        } else {
            let ema = (-self.a * dt).exp();
            let mean = x * ema + alpha_to - alpha_from * ema;
            let std_dev =
                self.sigma * ((1.0 - (-2.0 * self.a * dt).exp()) / (2.0 * self.a)).sqrt();
            (mean, std_dev)
        };

        Ok(mean + std_dev * dw)
    }

    /// European option on a zero-coupon bond, valued at time zero.
    ///
    /// `expiry` is the option expiry, `maturity` the bond maturity
    /// (`maturity > expiry`), `strike` the bond-price strike. Closed form:
    ///
    /// ```text
    /// sigma_p = sigma sqrt((1 - e^{-2a T}) / (2a)) B(T, S)
    /// h = ln(P(0,S) / (P(0,T) K)) / sigma_p + sigma_p / 2
    /// call = P(0,S) N(h) - K P(0,T) N(h - sigma_p)
    /// put  = K P(0,T) N(sigma_p - h) - P(0,S) N(-h)
    /// ```
    pub fn discount_bond_option(
        &self,
        expiry: f64,
        maturity: f64,
        strike: f64,
        option: BondOptionType,
    ) -> Result<f64, CurveError> {
        let p_expiry = self.curve.discount_factor(expiry)?;
        let p_maturity = self.curve.discount_factor(maturity)?;

        let factor_vol = if self.a < A_TINY {
            self.sigma * expiry.sqrt()
        } else {
            self.sigma * ((1.0 - (-2.0 * self.a * expiry).exp()) / (2.0 * self.a)).sqrt()
        };
        let sigma_p = factor_vol * self.b_factor(expiry, maturity);

        if sigma_p < 1e-12 {
            let intrinsic = match option {
                BondOptionType::Call => p_maturity - strike * p_expiry,
                BondOptionType::Put => strike * p_expiry - p_maturity,
            };
            return Ok(intrinsic.max(0.0));
        }

        let h = (p_maturity / (p_expiry * strike)).ln() / sigma_p + sigma_p / 2.0;
        let value = match option {
            BondOptionType::Call => {
                p_maturity * norm_cdf(h) - strike * p_expiry * norm_cdf(h - sigma_p)
            }
            BondOptionType::Put => {
                strike * p_expiry * norm_cdf(sigma_p - h) - p_maturity * norm_cdf(-h)
            }
        };
        Ok(value)
    }
}

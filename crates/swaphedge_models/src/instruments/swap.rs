//! Forward-starting interest-rate swaps on year-fraction schedules.
//!
//! Schedules are plain year fractions measured from the valuation date;
//! calendar and business-day adjustment happen upstream. The default
//! conventions are an annual fixed leg against a semi-annual floating leg.

use num_traits::Float;

use swaphedge_core::market_data::curves::YieldCurve;
use swaphedge_core::types::error::CurveError;

use crate::error::ScheduleError;

/// Which side of the fixed leg the option holder pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SwapDirection {
    /// Pay fixed, receive floating.
    Payer,
    /// Receive fixed, pay floating.
    Receiver,
}

impl SwapDirection {
    /// Sign applied to `(rate - strike)` in option payoffs: +1 for payer,
    /// -1 for receiver.
    pub fn payoff_sign<T: Float>(&self) -> T {
        match self {
            SwapDirection::Payer => T::one(),
            SwapDirection::Receiver => -T::one(),
        }
    }
}

/// A forward-starting fixed-for-floating swap.
///
/// # Example
///
/// ```
/// use swaphedge_models::instruments::swap::{InterestRateSwap, SwapDirection};
///
/// // 7y-forward 6y payer swap, 5% fixed, annual-vs-semiannual
/// let swap = InterestRateSwap::forward_starting(
///     SwapDirection::Payer,
///     1000.0_f64,
///     0.05,
///     7.0,
///     6.0,
/// ).unwrap();
///
/// assert_eq!(swap.fixed_payment_times().len(), 6);
/// assert_eq!(swap.end(), 13.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterestRateSwap<T: Float> {
    direction: SwapDirection,
    notional: T,
    fixed_rate: T,
    start: T,
    fixed_payment_times: Vec<T>,
    fixed_accruals: Vec<T>,
    float_payment_times: Vec<T>,
    float_accruals: Vec<T>,
}

impl<T: Float> InterestRateSwap<T> {
    /// Builds a forward-starting swap with the default conventions:
    /// annual fixed leg, semi-annual floating leg, unit accruals of
    /// `1/frequency` years.
    pub fn forward_starting(
        direction: SwapDirection,
        notional: T,
        fixed_rate: T,
        start_years: f64,
        tenor_years: f64,
    ) -> Result<Self, ScheduleError> {
        Self::with_frequencies(direction, notional, fixed_rate, start_years, tenor_years, 1, 2)
    }

    /// Builds a forward-starting swap with explicit payment frequencies
    /// (payments per year) for each leg.
    pub fn with_frequencies(
        direction: SwapDirection,
        notional: T,
        fixed_rate: T,
        start_years: f64,
        tenor_years: f64,
        fixed_frequency: u32,
        float_frequency: u32,
    ) -> Result<Self, ScheduleError> {
        if start_years < 0.0 {
            return Err(ScheduleError::invalid(format!(
                "swap start {start_years} is negative"
            )));
        }
        if tenor_years <= 0.0 {
            return Err(ScheduleError::invalid(format!(
                "swap tenor {tenor_years} must be positive"
            )));
        }
        if fixed_frequency == 0 || float_frequency == 0 {
            return Err(ScheduleError::invalid("payment frequency must be positive"));
        }

        let (fixed_payment_times, fixed_accruals) =
            build_schedule(start_years, tenor_years, fixed_frequency)?;
        let (float_payment_times, float_accruals) =
            build_schedule(start_years, tenor_years, float_frequency)?;

        let start = T::from(start_years).ok_or_else(|| {
            ScheduleError::invalid(format!("start {start_years} is not representable"))
        })?;

        Ok(Self {
            direction,
            notional,
            fixed_rate,
            start,
            fixed_payment_times,
            fixed_accruals,
            float_payment_times,
            float_accruals,
        })
    }

    /// Payer or receiver.
    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    /// Reference principal.
    pub fn notional(&self) -> T {
        self.notional
    }

    /// Fixed-leg coupon rate.
    pub fn fixed_rate(&self) -> T {
        self.fixed_rate
    }

    /// Swap start (first accrual begin), in years from valuation.
    pub fn start(&self) -> T {
        self.start
    }

    /// Last payment time, in years from valuation.
    pub fn end(&self) -> T {
        *self
            .fixed_payment_times
            .last()
            .unwrap_or(&self.start)
    }

    /// Fixed-leg payment times.
    pub fn fixed_payment_times(&self) -> &[T] {
        &self.fixed_payment_times
    }

    /// Fixed-leg accrual fractions.
    pub fn fixed_accruals(&self) -> &[T] {
        &self.fixed_accruals
    }

    /// Floating-leg payment times.
    pub fn float_payment_times(&self) -> &[T] {
        &self.float_payment_times
    }

    /// Returns a copy of this swap with a different fixed rate, keeping the
    /// schedules. Used to strike swaps at the par rate.
    pub fn with_fixed_rate(&self, fixed_rate: T) -> Self {
        let mut swap = self.clone();
        swap.fixed_rate = fixed_rate;
        swap
    }

    /// Returns a copy of this swap with a different notional.
    pub fn with_notional(&self, notional: T) -> Self {
        let mut swap = self.clone();
        swap.notional = notional;
        swap
    }

    /// Fixed-leg annuity: `sum(tau_i * D(t_i))` for a unit notional.
    pub fn annuity<C: YieldCurve<T>>(&self, curve: &C) -> Result<T, CurveError> {
        let mut total = T::zero();
        for (t, tau) in self.fixed_payment_times.iter().zip(&self.fixed_accruals) {
            total = total + *tau * curve.discount_factor(*t)?;
        }
        Ok(total)
    }

    /// Par swap rate implied by the curve:
    /// `(D(start) - D(end)) / annuity`.
    pub fn par_rate<C: YieldCurve<T>>(&self, curve: &C) -> Result<T, CurveError> {
        let df_start = curve.discount_factor(self.start)?;
        let df_end = curve.discount_factor(self.end())?;
        let annuity = self.annuity(curve)?;
        Ok((df_start - df_end) / annuity)
    }

    /// Present value of the fixed leg.
    pub fn fixed_leg_npv<C: YieldCurve<T>>(&self, curve: &C) -> Result<T, CurveError> {
        Ok(self.notional * self.fixed_rate * self.annuity(curve)?)
    }

    /// Present value of the floating leg: `notional * (D(start) - D(end))`.
    pub fn floating_leg_npv<C: YieldCurve<T>>(&self, curve: &C) -> Result<T, CurveError> {
        let df_start = curve.discount_factor(self.start)?;
        let df_end = curve.discount_factor(self.end())?;
        Ok(self.notional * (df_start - df_end))
    }

    /// Swap NPV from the option holder's perspective:
    /// floating minus fixed for a payer, fixed minus floating for a
    /// receiver.
    pub fn npv<C: YieldCurve<T>>(&self, curve: &C) -> Result<T, CurveError> {
        let float_leg = self.floating_leg_npv(curve)?;
        let fixed_leg = self.fixed_leg_npv(curve)?;
        Ok(self.direction.payoff_sign::<T>() * (float_leg - fixed_leg))
    }
}

/// Regular schedule of `tenor * frequency` periods after `start`.
fn build_schedule<T: Float>(
    start: f64,
    tenor: f64,
    frequency: u32,
) -> Result<(Vec<T>, Vec<T>), ScheduleError> {
    let n_periods = (tenor * frequency as f64).round() as usize;
    if n_periods == 0 {
        return Err(ScheduleError::invalid(format!(
            "tenor {tenor}y at frequency {frequency}/y yields no payment periods"
        )));
    }

    let step = 1.0 / frequency as f64;
    let mut times = Vec::with_capacity(n_periods);
    let mut accruals = Vec::with_capacity(n_periods);
    for i in 1..=n_periods {
        let t = start + i as f64 * step;
        times.push(T::from(t).ok_or_else(|| {
            ScheduleError::invalid(format!("payment time {t} is not representable"))
        })?);
        accruals.push(T::from(step).ok_or_else(|| {
            ScheduleError::invalid(format!("accrual {step} is not representable"))
        })?);
    }
    Ok((times, accruals))
}

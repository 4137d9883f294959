//! Interpolated discount curve built from (date, discount factor) pairs.
//!
//! The curve interpolates linearly on the discount-factor values themselves
//! between bracketing knots and extrapolates flat at both ends. It is
//! immutable once built and is rebuilt from fresh market data for every
//! valuation date.

use num_traits::Float;

use crate::math::interpolation::LinearInterpolator;
use crate::types::error::CurveError;
use crate::types::time::{Date, DayCount};

use super::traits::YieldCurve;

/// Discount curve with linear interpolation on discount factors.
///
/// # Example
///
/// ```
/// use swaphedge_core::market_data::curves::{DiscountCurve, YieldCurve};
///
/// let curve = DiscountCurve::from_times(
///     vec![0.0_f64, 1.0, 2.0, 5.0],
///     vec![1.0, 0.97, 0.94, 0.85],
/// ).unwrap();
///
/// assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
/// assert!((curve.discount_factor(1.5).unwrap() - 0.955).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountCurve<T: Float> {
    interp: LinearInterpolator<T>,
}

impl<T: Float> DiscountCurve<T> {
    /// Builds a curve from year-fraction knots and discount factors.
    ///
    /// Constraints: at least two points, equal-length inputs, strictly
    /// increasing times starting at 0, first factor exactly 1, all factors
    /// positive and finite.
    ///
    /// # Errors
    ///
    /// [`CurveError::InvalidCurveData`] describing the violated constraint.
    pub fn from_times(times: Vec<T>, factors: Vec<T>) -> Result<Self, CurveError> {
        if times.is_empty() || times[0] != T::zero() {
            return Err(CurveError::invalid_data(
                "curve must start at the valuation date (t = 0)",
            ));
        }
        if factors.is_empty() || factors[0] != T::one() {
            return Err(CurveError::invalid_data(
                "discount factor at the valuation date must be 1.0",
            ));
        }
        for (i, df) in factors.iter().enumerate() {
            if !df.is_finite() || *df <= T::zero() {
                return Err(CurveError::invalid_data(format!(
                    "discount factor at index {i} is not strictly positive and finite"
                )));
            }
        }

        let interp = LinearInterpolator::new(times, factors)?;
        Ok(Self { interp })
    }

    /// Builds a curve from dated discount factors.
    ///
    /// `dates[0]` is the valuation date and must carry a factor of exactly
    /// 1.0; later dates must be strictly increasing. Year fractions are
    /// taken under the given day count.
    pub fn from_dates(
        dates: &[Date],
        factors: &[T],
        day_count: DayCount,
    ) -> Result<Self, CurveError> {
        if dates.len() != factors.len() {
            return Err(CurveError::invalid_data(format!(
                "date/factor length mismatch: {} vs {}",
                dates.len(),
                factors.len()
            )));
        }
        if dates.is_empty() {
            return Err(CurveError::invalid_data("empty curve input"));
        }

        let valuation = dates[0];
        let times: Vec<T> = dates
            .iter()
            .map(|d| {
                let yf = day_count.year_fraction(valuation, *d);
                T::from(yf).ok_or_else(|| {
                    CurveError::invalid_data(format!("year fraction {yf} is not representable"))
                })
            })
            .collect::<Result<_, _>>()?;

        Self::from_times(times, factors.to_vec())
    }

    /// The year-fraction knots.
    pub fn times(&self) -> &[T] {
        self.interp.xs()
    }

    /// The discount factors at the knots.
    pub fn factors(&self) -> &[T] {
        self.interp.ys()
    }

    /// The last knot time; queries beyond it extrapolate flat.
    pub fn max_time(&self) -> T {
        *self
            .interp
            .xs()
            .last()
            .unwrap_or(&T::zero())
    }
}

impl<T: Float> YieldCurve<T> for DiscountCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, CurveError> {
        if t < T::zero() {
            return Err(CurveError::InvalidMaturity {
                t: t.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(self.interp.value(t))
    }
}

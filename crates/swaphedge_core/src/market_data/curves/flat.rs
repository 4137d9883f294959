//! Flat (constant continuously compounded rate) curve.
//!
//! Mostly a test and bootstrap aid: discount factors are exact
//! `exp(-r t)`, so forward rates and instantaneous forwards are exactly
//! `r` everywhere.

use num_traits::Float;

use crate::types::error::CurveError;

use super::traits::YieldCurve;

/// Curve with a single continuously compounded zero rate.
///
/// # Example
///
/// ```
/// use swaphedge_core::market_data::curves::{FlatCurve, YieldCurve};
///
/// let curve = FlatCurve::new(0.05_f64);
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCurve<T: Float> {
    rate: T,
}

impl<T: Float> FlatCurve<T> {
    /// Creates a flat curve at the given continuously compounded rate.
    pub fn new(rate: T) -> Self {
        Self { rate }
    }

    /// The constant zero rate.
    pub fn rate(&self) -> T {
        self.rate
    }
}

impl<T: Float> YieldCurve<T> for FlatCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, CurveError> {
        if t < T::zero() {
            return Err(CurveError::InvalidMaturity {
                t: t.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok((-self.rate * t).exp())
    }
}

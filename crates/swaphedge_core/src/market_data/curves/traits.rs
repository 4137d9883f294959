//! Yield curve trait definition.

use num_traits::Float;

use crate::types::error::CurveError;

/// Generic yield curve for discount factor and rate calculations.
///
/// # Contract
///
/// - `discount_factor(t)` returns the discount factor D(t) for maturity t
/// - `zero_rate(t)` returns the continuously compounded zero rate r(t)
/// - `forward_rate(t1, t2)` returns the forward rate between t1 and t2
///
/// # Invariants
///
/// - D(0) = 1
/// - D(t) > 0 for all t >= 0
/// - D(t1) >= D(t2) for t1 <= t2 on arbitrage-free input data
pub trait YieldCurve<T: Float> {
    /// Discount factor for maturity `t` (in years).
    ///
    /// # Errors
    ///
    /// [`CurveError::InvalidMaturity`] when `t < 0`.
    fn discount_factor(&self, t: T) -> Result<T, CurveError>;

    /// Continuously compounded zero rate for maturity `t`.
    ///
    /// Default: `r(t) = -ln(D(t)) / t`, requiring `t > 0`.
    fn zero_rate(&self, t: T) -> Result<T, CurveError> {
        let df = self.discount_factor(t)?;
        if t <= T::zero() {
            return Err(CurveError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(-df.ln() / t)
    }

    /// Continuously compounded forward rate between `t1` and `t2`.
    ///
    /// Default: `f(t1, t2) = -ln(D(t2) / D(t1)) / (t2 - t1)`, requiring
    /// `t2 > t1`.
    fn forward_rate(&self, t1: T, t2: T) -> Result<T, CurveError> {
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        let dt = t2 - t1;
        if dt <= T::zero() {
            return Err(CurveError::InvalidMaturity {
                t: dt.to_f64().unwrap_or(0.0),
            });
        }
        Ok(-(df2 / df1).ln() / dt)
    }

    /// Instantaneous forward rate f(0, t), approximated over a narrow
    /// finite-difference window. Used to fit the short-rate drift.
    fn instantaneous_forward(&self, t: T) -> Result<T, CurveError> {
        let h = T::from(1e-5).unwrap();
        if t < h {
            self.forward_rate(t, t + h)
        } else {
            self.forward_rate(t - h, t + h)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatCurve {
        rate: f64,
    }

    impl YieldCurve<f64> for FlatCurve {
        fn discount_factor(&self, t: f64) -> Result<f64, CurveError> {
            if t < 0.0 {
                return Err(CurveError::InvalidMaturity { t });
            }
            Ok((-self.rate * t).exp())
        }
    }

    #[test]
    fn test_default_zero_rate() {
        let curve = FlatCurve { rate: 0.05 };
        assert!((curve.zero_rate(2.0).unwrap() - 0.05).abs() < 1e-10);
    }

    #[test]
    fn test_default_zero_rate_rejects_t_zero() {
        let curve = FlatCurve { rate: 0.05 };
        assert!(curve.zero_rate(0.0).is_err());
    }

    #[test]
    fn test_default_forward_rate() {
        let curve = FlatCurve { rate: 0.05 };
        assert!((curve.forward_rate(1.0, 2.0).unwrap() - 0.05).abs() < 1e-10);
    }

    #[test]
    fn test_default_forward_rate_rejects_reversed() {
        let curve = FlatCurve { rate: 0.05 };
        assert!(curve.forward_rate(2.0, 1.0).is_err());
    }

    #[test]
    fn test_instantaneous_forward_on_flat_curve() {
        let curve = FlatCurve { rate: 0.03 };
        assert!((curve.instantaneous_forward(0.0).unwrap() - 0.03).abs() < 1e-8);
        assert!((curve.instantaneous_forward(5.0).unwrap() - 0.03).abs() < 1e-8);
    }
}

//! Piecewise-linear interpolation on tabulated values.
//!
//! The discount curve interpolates linearly on discount-factor values
//! directly (not on log-discount or zero rates), with flat extrapolation
//! beyond the first and last knots. The kernel is generic over `T: Float`.

use num_traits::Float;

use crate::types::error::InterpolationError;

/// Piecewise-linear interpolator over a strictly increasing abscissa grid.
///
/// Extrapolation is flat at both boundaries: queries before the first knot
/// return the first ordinate, queries past the last knot return the last.
///
/// # Example
///
/// ```
/// use swaphedge_core::math::interpolation::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(
///     vec![0.0_f64, 1.0, 2.0],
///     vec![1.0, 0.95, 0.9],
/// ).unwrap();
///
/// assert!((interp.value(0.5) - 0.975).abs() < 1e-12);
/// assert!((interp.value(-1.0) - 1.0).abs() < 1e-12); // flat left
/// assert!((interp.value(5.0) - 0.9).abs() < 1e-12);  // flat right
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Builds an interpolator over `(xs, ys)` pairs.
    ///
    /// # Errors
    ///
    /// - [`InterpolationError::InsufficientData`] for fewer than two points
    /// - [`InterpolationError::LengthMismatch`] when the vectors differ
    /// - [`InterpolationError::NonMonotonic`] when `xs` is not strictly
    ///   increasing
    pub fn new(xs: Vec<T>, ys: Vec<T>) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::LengthMismatch {
                x_len: xs.len(),
                y_len: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(InterpolationError::InsufficientData {
                required: 2,
                actual: xs.len(),
            });
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(InterpolationError::NonMonotonic { index: i });
            }
        }
        Ok(Self { xs, ys })
    }

    /// Interpolated value at `x`, flat beyond the boundary knots.
    pub fn value(&self, x: T) -> T {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        // Bracketing knot: first index with xs[i] >= x
        let mut hi = 1;
        while self.xs[hi] < x {
            hi += 1;
        }
        let lo = hi - 1;

        let w = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        self.ys[lo] + w * (self.ys[hi] - self.ys[lo])
    }

    /// The abscissa grid.
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// The ordinate values.
    pub fn ys(&self) -> &[T] {
        &self.ys
    }
}

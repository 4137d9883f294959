//! European swaptions.

use num_traits::Float;

use crate::error::ScheduleError;

use super::swap::InterestRateSwap;

/// A European option to enter an [`InterestRateSwap`] at its start date.
///
/// Exercise must happen at or before the swap start; in the standard case
/// the two coincide.
#[derive(Debug, Clone, PartialEq)]
pub struct Swaption<T: Float> {
    swap: InterestRateSwap<T>,
    expiry: T,
}

impl<T: Float> Swaption<T> {
    /// Wraps a swap with an exercise time (years from valuation).
    ///
    /// # Errors
    ///
    /// [`ScheduleError`] when the expiry is non-positive or falls after the
    /// swap start.
    pub fn new(swap: InterestRateSwap<T>, expiry: T) -> Result<Self, ScheduleError> {
        if expiry <= T::zero() {
            return Err(ScheduleError::invalid(
                "swaption expiry must be strictly positive",
            ));
        }
        if expiry > swap.start() {
            return Err(ScheduleError::invalid(
                "swaption expiry must not fall after the swap start",
            ));
        }
        Ok(Self { swap, expiry })
    }

    /// Wraps a swap exercising exactly at its start date.
    pub fn at_swap_start(swap: InterestRateSwap<T>) -> Result<Self, ScheduleError> {
        let expiry = swap.start();
        Self::new(swap, expiry)
    }

    /// The underlying swap.
    pub fn swap(&self) -> &InterestRateSwap<T> {
        &self.swap
    }

    /// Exercise time, in years from valuation.
    pub fn expiry(&self) -> T {
        self.expiry
    }
}

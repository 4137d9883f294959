//! Black-76 swaption pricing.
//!
//! Prices a European swaption on the lognormal forward swap rate:
//!
//! ```text
//! payer    = A * (F * N(d1) - K * N(d2))
//! receiver = A * (K * N(-d2) - F * N(-d1))
//! d1 = (ln(F/K) + vol^2 T / 2) / (vol sqrt(T)),  d2 = d1 - vol sqrt(T)
//! ```
//!
//! where `A` is the fixed-leg annuity (already discounted to valuation).

use num_traits::Float;

use crate::error::AnalyticalError;
use crate::instruments::swap::SwapDirection;

use super::distributions::norm_cdf;
use super::distributions::norm_pdf;

/// Total volatility below which the formula collapses to intrinsic value.
const MIN_TOTAL_VOL: f64 = 1e-10;

/// Black-76 price of a European swaption per unit notional.
///
/// # Arguments
///
/// * `direction` - payer or receiver
/// * `forward` - forward swap rate
/// * `strike` - fixed rate of the underlying swap
/// * `vol` - lognormal volatility (decimal, e.g. 0.20)
/// * `expiry` - option expiry in years
/// * `annuity` - discounted fixed-leg annuity
///
/// # Errors
///
/// [`AnalyticalError`] for non-positive forward/strike/expiry/annuity or a
/// negative volatility. A zero volatility is allowed and returns intrinsic
/// value.
pub fn black76_swaption_price<T: Float>(
    direction: SwapDirection,
    forward: T,
    strike: T,
    vol: T,
    expiry: T,
    annuity: T,
) -> Result<T, AnalyticalError> {
    validate_inputs(forward, strike, vol, expiry, annuity)?;

    let sign = direction.payoff_sign::<T>();
    let total_vol = vol * expiry.sqrt();

    if total_vol < T::from(MIN_TOTAL_VOL).unwrap() {
        let intrinsic = (sign * (forward - strike)).max(T::zero());
        return Ok(annuity * intrinsic);
    }

    let d1 = ((forward / strike).ln() + total_vol * total_vol / T::from(2.0).unwrap()) / total_vol;
    let d2 = d1 - total_vol;

    Ok(annuity * sign * (forward * norm_cdf(sign * d1) - strike * norm_cdf(sign * d2)))
}

/// Black-76 vega per unit notional: `A * F * sqrt(T) * phi(d1)`.
///
/// Identical for payer and receiver.
pub fn black76_vega<T: Float>(
    forward: T,
    strike: T,
    vol: T,
    expiry: T,
    annuity: T,
) -> Result<T, AnalyticalError> {
    validate_inputs(forward, strike, vol, expiry, annuity)?;

    let total_vol = vol * expiry.sqrt();
    if total_vol < T::from(MIN_TOTAL_VOL).unwrap() {
        return Ok(T::zero());
    }

    let d1 = ((forward / strike).ln() + total_vol * total_vol / T::from(2.0).unwrap()) / total_vol;
    Ok(annuity * forward * expiry.sqrt() * norm_pdf(d1))
}

fn validate_inputs<T: Float>(
    forward: T,
    strike: T,
    vol: T,
    expiry: T,
    annuity: T,
) -> Result<(), AnalyticalError> {
    if forward <= T::zero() || strike <= T::zero() {
        return Err(AnalyticalError::InvalidRate {
            forward: forward.to_f64().unwrap_or(f64::NAN),
            strike: strike.to_f64().unwrap_or(f64::NAN),
        });
    }
    if vol < T::zero() || !vol.is_finite() {
        return Err(AnalyticalError::InvalidVolatility {
            vol: vol.to_f64().unwrap_or(f64::NAN),
        });
    }
    if expiry <= T::zero() {
        return Err(AnalyticalError::InvalidExpiry {
            expiry: expiry.to_f64().unwrap_or(f64::NAN),
        });
    }
    if annuity <= T::zero() {
        return Err(AnalyticalError::InvalidAnnuity {
            annuity: annuity.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

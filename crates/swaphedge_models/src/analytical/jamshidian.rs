//! Jamshidian decomposition for European swaptions under Hull-White.
//!
//! Under a one-factor model the swap value at exercise is monotone in the
//! short rate, so the swaption decomposes exactly into a portfolio of
//! zero-coupon bond options: find the critical rate `r*` at which the
//! fixed-leg coupon bond (coupons `K tau_i`, unit redemption) is worth par,
//! then sum bond options struck at the bond prices implied by `r*` (puts
//! for a payer swaption, calls for a receiver).

use tracing::debug;

use swaphedge_core::market_data::curves::YieldCurve;
use swaphedge_core::math::solvers::BracketedNewtonSolver;

use crate::error::{PricingError, ScheduleError};
use crate::instruments::swap::SwapDirection;
use crate::instruments::swaption::Swaption;
use crate::models::hull_white::{BondOptionType, HullWhite};

/// Search interval for the critical short rate. Wide enough for any sane
/// market; the root-find fails loudly if the rate escapes it.
const RATE_BRACKET: (f64, f64) = (-5.0, 5.0);

/// Tolerance on the par-bond equation at the critical rate.
const CRITICAL_RATE_TOLERANCE: f64 = 1e-12;

/// Prices a European swaption by Jamshidian decomposition.
///
/// Requires exercise at the swap start (the standard European case); the
/// floating leg is then worth par at exercise. The result is non-negative
/// by construction.
///
/// # Errors
///
/// - [`ScheduleError`] when the swaption exercises before the swap starts
/// - [`SolverError::RootFindFailure`](swaphedge_core::types::error::SolverError)
///   when the critical-rate search fails
/// - [`CurveError`](swaphedge_core::types::error::CurveError) from curve
///   queries
pub fn price_swaption_jamshidian<C: YieldCurve<f64>>(
    model: &HullWhite<C>,
    swaption: &Swaption<f64>,
) -> Result<f64, PricingError> {
    let swap = swaption.swap();
    let expiry = swaption.expiry();

    if (swap.start() - expiry).abs() > 1e-12 {
        return Err(ScheduleError::invalid(
            "analytic engine requires exercise at the swap start",
        )
        .into());
    }

    // Coupon-bond cashflows: K * tau_i per period, plus unit redemption.
    let strike = swap.fixed_rate();
    let times = swap.fixed_payment_times();
    let accruals = swap.fixed_accruals();

    let mut cashflows: Vec<f64> = accruals.iter().map(|tau| strike * tau).collect();
    if let Some(last) = cashflows.last_mut() {
        *last += 1.0;
    }

    // Curve-dependent bond coefficients, computed once.
    let coeffs: Vec<(f64, f64)> = times
        .iter()
        .map(|t| model.bond_coefficients(expiry, *t))
        .collect::<Result<_, _>>()?;

    // Par-bond equation g(r) = sum c_i P(T, t_i; r) - 1, strictly
    // decreasing in r.
    let bond_value = |r: f64| -> f64 {
        cashflows
            .iter()
            .zip(&coeffs)
            .map(|(c, (ln_a, b))| c * (ln_a - b * r).exp())
            .sum::<f64>()
    };
    let g = |r: f64| bond_value(r) - 1.0;
    let dg = |r: f64| -> f64 {
        cashflows
            .iter()
            .zip(&coeffs)
            .map(|(c, (ln_a, b))| -b * c * (ln_a - b * r).exp())
            .sum::<f64>()
    };

    let guess = model.curve().instantaneous_forward(expiry)?;
    let solver = BracketedNewtonSolver::new(CRITICAL_RATE_TOLERANCE, 100);
    let critical_rate = solver.find_root(g, dg, guess, RATE_BRACKET.0, RATE_BRACKET.1)?;

    debug!(critical_rate, expiry, "critical rate located");

    // Strike each bond option at its price under the critical rate.
    let option = match swap.direction() {
        SwapDirection::Payer => BondOptionType::Put,
        SwapDirection::Receiver => BondOptionType::Call,
    };

    let mut value = 0.0;
    for ((c, t), (ln_a, b)) in cashflows.iter().zip(times).zip(&coeffs) {
        let bond_strike = (ln_a - b * critical_rate).exp();
        value += c * model.discount_bond_option(expiry, *t, bond_strike, option)?;
    }

    Ok(swap.notional() * value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use swaphedge_core::market_data::curves::FlatCurve;

    use crate::analytical::black76::black76_swaption_price;
    use crate::instruments::swap::InterestRateSwap;

    fn flat_setup(rate: f64, a: f64, sigma: f64) -> HullWhite<FlatCurve<f64>> {
        HullWhite::new(a, sigma, Arc::new(FlatCurve::new(rate))).unwrap()
    }

    fn atm_swaption(
        curve: &FlatCurve<f64>,
        direction: SwapDirection,
        start: f64,
        tenor: f64,
    ) -> Swaption<f64> {
        let swap =
            InterestRateSwap::forward_starting(direction, 1.0, 0.05, start, tenor).unwrap();
        let par = swap.par_rate(curve).unwrap();
        Swaption::at_swap_start(swap.with_fixed_rate(par)).unwrap()
    }

    #[test]
    fn test_npv_non_negative_payer_and_receiver() {
        let model = flat_setup(0.05, 0.1, 0.01);
        for direction in [SwapDirection::Payer, SwapDirection::Receiver] {
            for (start, tenor) in [(1.0, 1.0), (7.0, 6.0), (2.0, 10.0)] {
                let swaption = atm_swaption(model.curve(), direction, start, tenor);
                let npv = price_swaption_jamshidian(&model, &swaption).unwrap();
                assert!(npv >= 0.0, "negative NPV for {direction:?} {start}x{tenor}");
            }
        }
    }

    #[test]
    fn test_atm_payer_close_to_receiver() {
        // ATM forward: payer and receiver swaptions have equal value
        let model = flat_setup(0.05, 0.1, 0.01);
        let payer = price_swaption_jamshidian(
            &model,
            &atm_swaption(model.curve(), SwapDirection::Payer, 7.0, 6.0),
        )
        .unwrap();
        let receiver = price_swaption_jamshidian(
            &model,
            &atm_swaption(model.curve(), SwapDirection::Receiver, 7.0, 6.0),
        )
        .unwrap();
        assert_relative_eq!(payer, receiver, epsilon = 1e-10);
    }

    #[test]
    fn test_value_increases_with_sigma() {
        let low = flat_setup(0.05, 0.1, 0.005);
        let high = flat_setup(0.05, 0.1, 0.02);
        let swaption = atm_swaption(low.curve(), SwapDirection::Payer, 7.0, 6.0);
        let v_low = price_swaption_jamshidian(&low, &swaption).unwrap();
        let v_high = price_swaption_jamshidian(&high, &swaption).unwrap();
        assert!(v_high > v_low);
    }

    #[test]
    fn test_deep_itm_payer_approaches_swap_value() {
        // Strike far below forward: option ~ forward swap value
        let model = flat_setup(0.05, 0.1, 0.003);
        let swap = InterestRateSwap::forward_starting(
            SwapDirection::Payer,
            1.0,
            0.005,
            5.0,
            5.0,
        )
        .unwrap();
        let swaption = Swaption::at_swap_start(swap.clone()).unwrap();
        let npv = price_swaption_jamshidian(&model, &swaption).unwrap();
        let swap_value = swap.npv(model.curve().as_ref()).unwrap();
        assert_relative_eq!(npv, swap_value, max_relative = 1e-3);
    }

    #[test]
    fn test_matches_black76_order_of_magnitude() {
        // Hull-White and Black-76 should agree to within tens of percent
        // for a comparable vol level; this pins the scale, not the digits.
        let model = flat_setup(0.05, 0.1, 0.01);
        let swaption = atm_swaption(model.curve(), SwapDirection::Payer, 7.0, 6.0);
        let hw = price_swaption_jamshidian(&model, &swaption).unwrap();

        let swap = swaption.swap();
        let forward = swap.par_rate(model.curve().as_ref()).unwrap();
        let annuity = swap.annuity(model.curve().as_ref()).unwrap();
        let black = black76_swaption_price(
            SwapDirection::Payer,
            forward,
            swap.fixed_rate(),
            0.2,
            swaption.expiry(),
            annuity,
        )
        .unwrap();

        assert!(hw > 0.1 * black);
        assert!(hw < 10.0 * black);
    }

    #[test]
    fn test_notional_scaling() {
        let model = flat_setup(0.05, 0.1, 0.01);
        let unit = atm_swaption(model.curve(), SwapDirection::Payer, 7.0, 6.0);
        let scaled = Swaption::at_swap_start(unit.swap().with_notional(1000.0)).unwrap();
        let v_unit = price_swaption_jamshidian(&model, &unit).unwrap();
        let v_scaled = price_swaption_jamshidian(&model, &scaled).unwrap();
        assert_relative_eq!(v_scaled, 1000.0 * v_unit, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_early_exercise() {
        let model = flat_setup(0.05, 0.1, 0.01);
        let swap = InterestRateSwap::forward_starting(
            SwapDirection::Payer,
            1.0,
            0.05,
            7.0,
            6.0,
        )
        .unwrap();
        let early = Swaption::new(swap, 6.0).unwrap();
        let result = price_swaption_jamshidian(&model, &early);
        assert!(matches!(result, Err(PricingError::Schedule(_))));
    }
}

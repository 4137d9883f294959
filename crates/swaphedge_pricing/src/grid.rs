//! Pricing sweeps over a maturity/tenor grid.
//!
//! After calibration it is common to re-price the whole quoted grid under
//! the fitted model, both to eyeball the fit and to export a model-implied
//! surface. Cells are independent, so the sweep maps over them in
//! parallel and collects in grid order.

use rayon::prelude::*;
use tracing::warn;

use swaphedge_core::market_data::curves::YieldCurve;
use swaphedge_models::analytical::jamshidian::price_swaption_jamshidian;
use swaphedge_models::analytical::ImpliedVolatilitySolver;
use swaphedge_models::error::PricingError;
use swaphedge_models::instruments::swap::{InterestRateSwap, SwapDirection};
use swaphedge_models::instruments::Swaption;
use swaphedge_models::HullWhite;

/// Placeholder coupon used to build schedules before striking at par.
const SCHEDULE_RATE: f64 = 0.03;

/// One cell of a model-implied pricing grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GridCell {
    /// Option maturity, in years.
    pub maturity_years: f64,
    /// Underlying tenor, in years.
    pub tenor_years: f64,
    /// Analytic NPV of the ATM payer swaption on unit notional.
    pub npv: f64,
    /// Black-76 volatility implied by the model price; `None` when the
    /// inversion fails.
    pub implied_vol: Option<f64>,
}

/// Prices ATM payer swaptions across the full maturity x tenor grid under
/// the given model, returning cells in row-major order (maturities outer,
/// tenors inner).
pub fn price_grid<C>(
    model: &HullWhite<C>,
    maturities: &[f64],
    tenors: &[f64],
) -> Result<Vec<GridCell>, PricingError>
where
    C: YieldCurve<f64> + Send + Sync,
{
    let cells: Vec<(f64, f64)> = maturities
        .iter()
        .flat_map(|m| tenors.iter().map(move |t| (*m, *t)))
        .collect();

    cells
        .par_iter()
        .map(|(maturity, tenor)| price_cell(model, *maturity, *tenor))
        .collect()
}

fn price_cell<C: YieldCurve<f64>>(
    model: &HullWhite<C>,
    maturity: f64,
    tenor: f64,
) -> Result<GridCell, PricingError> {
    let swap = InterestRateSwap::forward_starting(
        SwapDirection::Payer,
        1.0,
        SCHEDULE_RATE,
        maturity,
        tenor,
    )?;
    let curve = model.curve().as_ref();
    let forward = swap.par_rate(curve)?;
    let annuity = swap.annuity(curve)?;
    let swaption = Swaption::at_swap_start(swap.with_fixed_rate(forward))?;

    let npv = price_swaption_jamshidian(model, &swaption)?;

    let implied_vol = ImpliedVolatilitySolver::default()
        .solve(npv, SwapDirection::Payer, forward, forward, maturity, annuity)
        .map_err(|err| {
            warn!(maturity, tenor, %err, "implied vol inversion failed for grid cell");
            err
        })
        .ok();

    Ok(GridCell {
        maturity_years: maturity,
        tenor_years: tenor,
        npv,
        implied_vol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use swaphedge_core::market_data::curves::FlatCurve;

    fn model() -> HullWhite<FlatCurve<f64>> {
        HullWhite::new(0.1, 0.01, Arc::new(FlatCurve::new(0.05))).unwrap()
    }

    #[test]
    fn test_grid_is_row_major_and_complete() {
        let cells = price_grid(&model(), &[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(cells.len(), 6);
        assert_eq!((cells[0].maturity_years, cells[0].tenor_years), (1.0, 1.0));
        assert_eq!((cells[2].maturity_years, cells[2].tenor_years), (1.0, 3.0));
        assert_eq!((cells[3].maturity_years, cells[3].tenor_years), (2.0, 1.0));
    }

    #[test]
    fn test_cells_have_positive_prices_and_vols() {
        let cells = price_grid(&model(), &[1.0, 3.0, 5.0], &[1.0, 5.0]).unwrap();
        for cell in &cells {
            assert!(cell.npv > 0.0);
            let vol = cell.implied_vol.unwrap();
            assert!(vol > 0.0 && vol < 4.0);
        }
    }

    #[test]
    fn test_npv_increases_with_maturity_at_fixed_tenor() {
        // More time to expiry, more optionality
        let cells = price_grid(&model(), &[1.0, 2.0, 4.0], &[5.0]).unwrap();
        assert!(cells[0].npv < cells[1].npv);
        assert!(cells[1].npv < cells[2].npv);
    }

    #[test]
    fn test_empty_axes_give_empty_grid() {
        let cells = price_grid(&model(), &[], &[1.0]).unwrap();
        assert!(cells.is_empty());
    }
}

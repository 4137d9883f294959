//! End-to-end tests on a real market data set: the 2008-07-01 EUR
//! discount curve and its 10x10 ATM swaption volatility surface.

use std::sync::Arc;

use approx::assert_relative_eq;

use swaphedge_core::market_data::curves::{DiscountCurve, YieldCurve};
use swaphedge_core::types::time::{Date, DayCount};
use swaphedge_models::analytical::jamshidian::price_swaption_jamshidian;
use swaphedge_models::analytical::ImpliedVolatilitySolver;
use swaphedge_models::calibration::{CalibrationEngine, OutlierPolicy, VolSurface};
use swaphedge_models::instruments::swap::{InterestRateSwap, SwapDirection};
use swaphedge_models::instruments::Swaption;
use swaphedge_models::HullWhite;

use crate::hedging::{HedgingConfig, HedgingSeriesRunner, MarketSnapshot};
use crate::mc::{MonteCarloConfig, MonteCarloPricer};

/// Discount factors observed on 2008-07-01.
const MARKET_DFS: [f64; 24] = [
    1.0, 0.999372, 0.998612, 0.997533, 0.99626, 0.994644, 0.992501, 0.989723, 0.98572, 0.96545,
    0.936598, 0.90133, 0.862887, 0.82346, 0.784508, 0.746472, 0.709697, 0.674411, 0.640635,
    0.549721, 0.432787, 0.343264, 0.273871, 0.180376,
];

/// ATM swaption volatility surface observed on 2008-07-01; rows are
/// option maturities 1..=10y, columns are swap tenors 1..=10y.
#[rustfmt::skip]
const MARKET_VOLS: [f64; 100] = [
    0.719,  0.598,  0.5,    0.428,  0.3878, 0.353,  0.3297, 0.3155, 0.3048, 0.2915,
    0.5442, 0.4475, 0.3835, 0.3453, 0.3215, 0.3033, 0.2888, 0.281,  0.273,  0.2643,
    0.3808, 0.3358, 0.3075, 0.29,   0.2783, 0.2688, 0.2595, 0.2577, 0.252,  0.2448,
    0.2965, 0.2788, 0.2655, 0.2573, 0.25,   0.2442, 0.2385, 0.2375, 0.2348, 0.2288,
    0.258,  0.252,  0.2455, 0.237,  0.233,  0.2285, 0.2242, 0.224,  0.2215, 0.217,
    0.2385, 0.234,  0.229,  0.225,  0.222,  0.2188, 0.2148, 0.2135, 0.2125, 0.2095,
    0.225,  0.2227, 0.217,  0.2125, 0.208,  0.208,  0.204,  0.2055, 0.205,  0.2008,
    0.212,  0.211,  0.2073, 0.2035, 0.2018, 0.2005, 0.198,  0.198,  0.1977, 0.197,
    0.2045, 0.2023, 0.2002, 0.1968, 0.1943, 0.193,  0.1905, 0.1902, 0.1905, 0.1908,
    0.1968, 0.193,  0.1907, 0.1885, 0.1868, 0.186,  0.1848, 0.1865, 0.1865, 0.184,
];

/// Curve pillar dates: settlement, then 3/5/8/11/14/17/20 months, then
/// 2..=12, 15, 20, 25, 30, 40 years.
fn market_dates() -> Vec<Date> {
    let ymd = |y, m, d| Date::from_ymd(y, m, d).unwrap();
    vec![
        ymd(2008, 7, 1),
        ymd(2008, 10, 1),
        ymd(2008, 12, 1),
        ymd(2009, 3, 1),
        ymd(2009, 6, 1),
        ymd(2009, 9, 1),
        ymd(2009, 12, 1),
        ymd(2010, 3, 1),
        ymd(2010, 7, 1),
        ymd(2011, 7, 1),
        ymd(2012, 7, 1),
        ymd(2013, 7, 1),
        ymd(2014, 7, 1),
        ymd(2015, 7, 1),
        ymd(2016, 7, 1),
        ymd(2017, 7, 1),
        ymd(2018, 7, 1),
        ymd(2019, 7, 1),
        ymd(2020, 7, 1),
        ymd(2023, 7, 1),
        ymd(2028, 7, 1),
        ymd(2033, 7, 1),
        ymd(2038, 7, 1),
        ymd(2048, 7, 1),
    ]
}

fn market_curve() -> Arc<DiscountCurve<f64>> {
    Arc::new(
        DiscountCurve::from_dates(&market_dates(), &MARKET_DFS, DayCount::Act365Fixed).unwrap(),
    )
}

fn market_surface() -> VolSurface {
    let axis: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    VolSurface::new(axis.clone(), axis, MARKET_VOLS.to_vec()).unwrap()
}

fn calibrated_model() -> (Arc<DiscountCurve<f64>>, HullWhite<DiscountCurve<f64>>) {
    let curve = market_curve();
    let outcome = CalibrationEngine::default()
        .calibrate(&curve, &market_surface().anti_diagonal(), None)
        .unwrap();
    let model = HullWhite::new(
        outcome.params.mean_reversion,
        outcome.params.volatility,
        curve.clone(),
    )
    .unwrap();
    (curve, model)
}

fn atm_swaption(
    curve: &DiscountCurve<f64>,
    maturity: f64,
    tenor: f64,
) -> (Swaption<f64>, f64, f64) {
    let swap =
        InterestRateSwap::forward_starting(SwapDirection::Payer, 1.0, 0.03, maturity, tenor)
            .unwrap();
    let forward = swap.par_rate(curve).unwrap();
    let annuity = swap.annuity(curve).unwrap();
    let swaption = Swaption::at_swap_start(swap.with_fixed_rate(forward)).unwrap();
    (swaption, forward, annuity)
}

#[test]
fn test_market_curve_shape() {
    let curve = market_curve();
    assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
    // Factors decrease with maturity on this curve
    let mut previous = 1.0;
    for t in [1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 40.0] {
        let df = curve.discount_factor(t).unwrap();
        assert!(df < previous, "df({t}) = {df} not below {previous}");
        previous = df;
    }
    // Flat extrapolation past the last pillar
    let last = curve.discount_factor(40.2).unwrap();
    assert_relative_eq!(last, curve.discount_factor(50.0).unwrap());
}

#[test]
fn test_calibration_on_market_anti_diagonal() {
    let curve = market_curve();
    let quotes = market_surface().anti_diagonal();
    assert_eq!(quotes.len(), 10);

    let outcome = CalibrationEngine::default()
        .calibrate(&curve, &quotes, None)
        .unwrap();

    assert!(outcome.params.is_valid());
    assert!(outcome.params.mean_reversion < 5.0);
    assert!(outcome.params.volatility < 0.2);
    assert_eq!(outcome.diagnostics.len(), 10);
    // A two-parameter model cannot fit a real surface exactly, but it
    // should land in the right neighbourhood on every instrument.
    for diag in &outcome.diagnostics {
        assert!(
            diag.relative_price_error < 0.5,
            "{}x{}: price error {}",
            diag.maturity_years,
            diag.tenor_years,
            diag.relative_price_error
        );
    }
}

#[test]
fn test_outlier_refit_flags_corrupted_cell() {
    let curve = market_curve();
    let mut quotes = market_surface().anti_diagonal();
    quotes[4].market_vol *= 3.0;

    let outcome = CalibrationEngine::default()
        .calibrate(&curve, &quotes, Some(&OutlierPolicy::default()))
        .unwrap();

    assert!(outcome.diagnostics[4].excluded);
    assert!(outcome.excluded_count() < quotes.len());
    // Diagnostics are still reported for the excluded instrument
    assert!(outcome.diagnostics[4].relative_price_error.is_finite());
}

#[test]
fn test_seven_into_six_analytic_price() {
    let (curve, model) = calibrated_model();
    let (swaption, forward, annuity) = atm_swaption(&curve, 7.0, 6.0);

    let npv = price_swaption_jamshidian(&model, &swaption).unwrap();
    assert!(npv > 0.0);
    // An option is worth less than the forward annuity payout it caps
    assert!(npv < forward * annuity);

    let implied = ImpliedVolatilitySolver::default()
        .solve(npv, SwapDirection::Payer, forward, forward, 7.0, annuity)
        .unwrap();
    assert!(implied > 0.05 && implied < 1.0, "implied vol {implied}");
}

#[test]
fn test_one_into_one_analytic_price() {
    let (curve, model) = calibrated_model();
    let (swaption, _, _) = atm_swaption(&curve, 1.0, 1.0);

    let npv = price_swaption_jamshidian(&model, &swaption).unwrap();
    // Order-of-magnitude bound: a short ATM option on this curve is
    // worth a handful of basis points of notional, not tens of percent.
    assert!(npv > 1e-5, "npv {npv}");
    assert!(npv < 0.02, "npv {npv}");
}

#[test]
fn test_monte_carlo_tracks_analytic_on_market_curve() {
    let (curve, model) = calibrated_model();
    let (swaption, _, _) = atm_swaption(&curve, 2.0, 5.0);

    let analytic = price_swaption_jamshidian(&model, &swaption).unwrap();
    let mc = MonteCarloPricer::new(MonteCarloConfig::default().with_seed(2008))
        .price(&model, &swaption)
        .unwrap();

    assert_relative_eq!(mc.npv, analytic, max_relative = 0.10);
    assert_eq!(mc.degenerate_paths, 0);
}

#[test]
fn test_monte_carlo_is_reproducible_on_market_curve() {
    let (curve, model) = calibrated_model();
    let (swaption, _, _) = atm_swaption(&curve, 2.0, 5.0);
    let pricer = MonteCarloPricer::new(MonteCarloConfig::default().with_seed(31));

    let first = pricer.price(&model, &swaption).unwrap();
    let second = pricer.price(&model, &swaption).unwrap();
    assert_eq!(first.npv.to_bits(), second.npv.to_bits());
}

#[test]
fn test_hedging_series_on_shifted_curves() {
    // Three snapshots: the observed curve plus parallel shifts of the
    // zero curve by +/- 50bp.
    let dates = market_dates();
    let surface = market_surface();
    let snapshot = |label: &str, shift: f64| {
        let base = dates[0];
        let factors: Vec<f64> = dates
            .iter()
            .zip(&MARKET_DFS)
            .map(|(date, df)| {
                let t = (*date - base) as f64 / 365.0;
                df * (-shift * t).exp()
            })
            .collect();
        MarketSnapshot {
            label: label.to_string(),
            dates: dates.clone(),
            discount_factors: factors,
            surface: surface.clone(),
        }
    };

    let snapshots = vec![
        snapshot("2008-07-01", 0.0),
        snapshot("up-50bp", 0.005),
        snapshot("down-50bp", -0.005),
    ];

    let runner = HedgingSeriesRunner::new(HedgingConfig::default());
    let records = runner.run(&snapshots).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].label, "2008-07-01");
    // ATM at inception
    assert_relative_eq!(records[0].swap_npv, 0.0, epsilon = 1e-6);
    assert!(records[0].swaption_npv > 0.0);
    // A payer position gains when rates rise and loses when they fall
    assert!(records[1].swap_npv > 0.0);
    assert!(records[2].swap_npv < 0.0);
    assert!(records[1].swaption_npv > records[2].swaption_npv);
}

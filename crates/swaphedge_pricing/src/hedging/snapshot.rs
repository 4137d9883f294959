//! One valuation date's market data.

use swaphedge_core::market_data::curves::DiscountCurve;
use swaphedge_core::types::error::CurveError;
use swaphedge_core::types::time::{Date, DayCount};
use swaphedge_models::calibration::VolSurface;

/// Market data observed on one valuation date: a discount curve by pillar
/// date and a swaption volatility surface.
///
/// The first pillar is the valuation date itself and must carry a
/// discount factor of 1.0.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MarketSnapshot {
    /// Human-readable snapshot label, conventionally the valuation date.
    pub label: String,
    /// Curve pillar dates, valuation date first.
    pub dates: Vec<Date>,
    /// Discount factors per pillar.
    pub discount_factors: Vec<f64>,
    /// Swaption volatility surface observed on this date.
    pub surface: VolSurface,
}

impl MarketSnapshot {
    /// Builds the discount curve for this snapshot.
    pub fn build_curve(&self, day_count: DayCount) -> Result<DiscountCurve<f64>, CurveError> {
        DiscountCurve::from_dates(&self.dates, &self.discount_factors, day_count)
    }

    /// The valuation date (first pillar).
    pub fn valuation_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaphedge_core::market_data::curves::YieldCurve;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            label: "2024-03-01".to_string(),
            dates: vec![
                Date::from_ymd(2024, 3, 1).unwrap(),
                Date::from_ymd(2025, 3, 1).unwrap(),
                Date::from_ymd(2026, 3, 1).unwrap(),
            ],
            discount_factors: vec![1.0, 0.95, 0.90],
            surface: VolSurface::new(vec![1.0], vec![1.0], vec![0.2]).unwrap(),
        }
    }

    #[test]
    fn test_build_curve() {
        let curve = snapshot().build_curve(DayCount::Act365Fixed).unwrap();
        let df = curve.discount_factor(0.0).unwrap();
        assert_eq!(df, 1.0);
    }

    #[test]
    fn test_valuation_date() {
        let date = snapshot().valuation_date().unwrap();
        assert_eq!(date.year(), 2024);
    }

    #[test]
    fn test_bad_first_factor_rejected() {
        let mut snap = snapshot();
        snap.discount_factors[0] = 0.99;
        assert!(snap.build_curve(DayCount::Act365Fixed).is_err());
    }
}

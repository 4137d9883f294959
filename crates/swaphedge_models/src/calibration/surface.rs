//! Swaption volatility quotes and surfaces.

use crate::error::CalibrationError;

/// A single swaption volatility quote, keyed by option maturity and
/// underlying tenor. Volatilities are decimal (0.20, not 20).
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SwaptionQuote {
    /// Option maturity, in years.
    pub maturity_years: f64,
    /// Underlying swap tenor, in years.
    pub tenor_years: f64,
    /// Market lognormal volatility, decimal.
    pub market_vol: f64,
}

/// A rectangular swaption volatility surface.
///
/// Rows are option maturities, columns are underlying tenors; values are
/// decimal lognormal volatilities.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VolSurface {
    maturities: Vec<f64>,
    tenors: Vec<f64>,
    /// Row-major: `vols[i * tenors.len() + j]` is maturity `i`, tenor `j`.
    vols: Vec<f64>,
}

impl VolSurface {
    /// Builds a surface from decimal volatilities in row-major order.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::NoInstruments`] when the grid is empty or the
    /// value count does not match `maturities.len() * tenors.len()`, or
    /// when any volatility is non-positive or non-finite.
    pub fn new(
        maturities: Vec<f64>,
        tenors: Vec<f64>,
        vols: Vec<f64>,
    ) -> Result<Self, CalibrationError> {
        let expected = maturities.len() * tenors.len();
        if expected == 0 || vols.len() != expected {
            return Err(CalibrationError::NoInstruments {
                supplied: vols.len(),
                usable: 0,
            });
        }
        if vols.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(CalibrationError::NoInstruments {
                supplied: vols.len(),
                usable: vols.iter().filter(|v| v.is_finite() && **v > 0.0).count(),
            });
        }
        Ok(Self {
            maturities,
            tenors,
            vols,
        })
    }

    /// Builds a surface from volatilities quoted in percent (as market
    /// data files carry them), converting to decimal.
    pub fn from_percent(
        maturities: Vec<f64>,
        tenors: Vec<f64>,
        vols_percent: Vec<f64>,
    ) -> Result<Self, CalibrationError> {
        let vols = vols_percent.iter().map(|v| v / 100.0).collect();
        Self::new(maturities, tenors, vols)
    }

    /// Option maturities (row labels).
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Underlying tenors (column labels).
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Volatility at maturity index `i`, tenor index `j`.
    pub fn vol(&self, i: usize, j: usize) -> f64 {
        self.vols[i * self.tenors.len() + j]
    }

    /// Quote at maturity index `i`, tenor index `j`.
    pub fn quote(&self, i: usize, j: usize) -> SwaptionQuote {
        SwaptionQuote {
            maturity_years: self.maturities[i],
            tenor_years: self.tenors[j],
            market_vol: self.vol(i, j),
        }
    }

    /// Every cell of the surface as a quote list, row by row.
    pub fn all_quotes(&self) -> Vec<SwaptionQuote> {
        let mut quotes = Vec::with_capacity(self.vols.len());
        for i in 0..self.maturities.len() {
            for j in 0..self.tenors.len() {
                quotes.push(self.quote(i, j));
            }
        }
        quotes
    }

    /// The anti-diagonal cells `(i, n_tenors - 1 - i)`: the co-terminal
    /// sweep conventionally used to calibrate against a single exercise
    /// horizon. Stops at the shorter of the two axes.
    pub fn anti_diagonal(&self) -> Vec<SwaptionQuote> {
        let n = self.maturities.len().min(self.tenors.len());
        (0..n)
            .map(|i| self.quote(i, self.tenors.len() - 1 - i))
            .collect()
    }
}

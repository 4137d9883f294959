//! Calibration results and per-instrument diagnostics.

/// Calibrated Hull-White parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ModelParameters {
    /// Mean-reversion speed `a`.
    pub mean_reversion: f64,
    /// Short-rate volatility `sigma`.
    pub volatility: f64,
}

impl ModelParameters {
    /// Both parameters strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        self.mean_reversion.is_finite()
            && self.volatility.is_finite()
            && self.mean_reversion > 0.0
            && self.volatility > 0.0
    }
}

/// Fit quality of one calibration instrument, reported for every
/// instrument considered, with excluded ones present and flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct InstrumentDiagnostic {
    /// Option maturity, in years.
    pub maturity_years: f64,
    /// Underlying tenor, in years.
    pub tenor_years: f64,
    /// `|implied_vol(model price) - market vol| / market vol`. NaN when
    /// the model price could not be inverted.
    pub relative_vol_error: f64,
    /// `|model price - market price| / market price`.
    pub relative_price_error: f64,
    /// Whether the outlier refit dropped this instrument.
    pub excluded: bool,
}

/// Outcome of a calibration run.
///
/// `converged == false` is a soft failure: `params` still hold the best
/// parameters found and remain usable downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    /// Fitted parameters (best-effort when not converged).
    pub params: ModelParameters,
    /// Whether the optimizer met a stopping tolerance.
    pub converged: bool,
    /// Optimizer iterations of the final fit pass.
    pub iterations: usize,
    /// Final residual sum of squares over the active instruments.
    pub residual_ss: f64,
    /// Per-instrument fit quality, in input order.
    pub diagnostics: Vec<InstrumentDiagnostic>,
}

impl CalibrationOutcome {
    /// Number of instruments the outlier refit excluded.
    pub fn excluded_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.excluded).count()
    }

    /// Diagnostics of the instruments that stayed in the fit.
    pub fn active_diagnostics(&self) -> impl Iterator<Item = &InstrumentDiagnostic> {
        self.diagnostics.iter().filter(|d| !d.excluded)
    }
}

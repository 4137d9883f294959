//! Calibration of the Hull-White model to a swaption volatility surface.

pub mod engine;
pub mod result;
pub mod surface;

pub use engine::{CalibrationConfig, CalibrationEngine, OutlierPolicy, ParameterBounds};
pub use result::{CalibrationOutcome, InstrumentDiagnostic, ModelParameters};
pub use surface::{SwaptionQuote, VolSurface};

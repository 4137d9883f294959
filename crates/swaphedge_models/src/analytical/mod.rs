//! Closed-form analytics: distributions, Black-76, implied volatility and
//! the Jamshidian swaption decomposition.

pub mod black76;
pub mod distributions;
pub mod implied_vol;
pub mod jamshidian;

pub use black76::{black76_swaption_price, black76_vega};
pub use implied_vol::{ImpliedVolError, ImpliedVolatilitySolver};
pub use jamshidian::price_swaption_jamshidian;

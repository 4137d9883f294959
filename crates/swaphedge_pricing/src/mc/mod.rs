//! Monte Carlo European swaption pricing under Hull-White.
//!
//! One exact simulation step carries the factor from today to option
//! expiry; the payoff is evaluated from analytic bond prices in the
//! simulated state and discounted on the spot curve. Paths are generated
//! and reduced in a fixed order, so a given seed always reproduces the
//! same NPV bit for bit, regardless of thread count.

mod config;
mod pricer;

pub use config::MonteCarloConfig;
pub use pricer::{McResult, MonteCarloPricer};

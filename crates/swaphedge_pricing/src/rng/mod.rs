//! Random number generation for Monte Carlo simulations.
//!
//! Seeded, reproducible generators only: every simulation in this crate
//! takes an explicit seed, and the same seed always replays the same
//! paths.

mod prng;

pub use prng::PathRng;

//! Monte Carlo simulation configuration.

use crate::error::SimulationError;

/// Upper bound on the number of paths a single run may request.
pub const MAX_PATHS: usize = 10_000_000;

/// Monte Carlo configuration.
///
/// Defaults: 10,000 paths, seed 42, and at most 1% of paths discarded as
/// degenerate before the run is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloConfig {
    n_paths: usize,
    seed: u64,
    max_degenerate_fraction: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_paths: 10_000,
            seed: 42,
            max_degenerate_fraction: 0.01,
        }
    }
}

impl MonteCarloConfig {
    /// Sets the number of simulation paths.
    pub fn with_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = n_paths;
        self
    }

    /// Sets the base seed. Path `i` draws from seed `base + i`, so runs
    /// with the same base seed replay identical paths.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the fraction of degenerate paths tolerated before the run is
    /// rejected.
    pub fn with_max_degenerate_fraction(mut self, fraction: f64) -> Self {
        self.max_degenerate_fraction = fraction;
        self
    }

    /// Number of simulation paths.
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Tolerated degenerate-path fraction.
    pub fn max_degenerate_fraction(&self) -> f64 {
        self.max_degenerate_fraction
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(SimulationError::InvalidConfig {
                reason: format!("n_paths must be in 1..={MAX_PATHS}, got {}", self.n_paths),
            });
        }
        if !(0.0..=1.0).contains(&self.max_degenerate_fraction) {
            return Err(SimulationError::InvalidConfig {
                reason: format!(
                    "max_degenerate_fraction must be in [0, 1], got {}",
                    self.max_degenerate_fraction
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonteCarloConfig::default();
        assert_eq!(config.n_paths(), 10_000);
        assert_eq!(config.seed(), 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = MonteCarloConfig::default()
            .with_paths(50_000)
            .with_seed(7)
            .with_max_degenerate_fraction(0.0);
        assert_eq!(config.n_paths(), 50_000);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.max_degenerate_fraction(), 0.0);
    }

    #[test]
    fn test_rejects_zero_paths() {
        let config = MonteCarloConfig::default().with_paths(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let config = MonteCarloConfig::default().with_max_degenerate_fraction(1.5);
        assert!(config.validate().is_err());
    }
}

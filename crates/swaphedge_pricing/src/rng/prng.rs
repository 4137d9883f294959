//! Seeded pseudo-random number generator wrapper.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Seeded PRNG for path simulation.
///
/// Wraps `rand::StdRng` with the seed retained for logging, and exposes
/// the two draws the pricers need. Static dispatch only; no trait objects
/// in the sampling path.
///
/// # Examples
///
/// ```rust
/// use swaphedge_pricing::rng::PathRng;
///
/// let mut a = PathRng::from_seed(42);
/// let mut b = PathRng::from_seed(42);
/// assert_eq!(a.standard_normal(), b.standard_normal());
/// ```
pub struct PathRng {
    inner: StdRng,
    seed: u64,
}

impl PathRng {
    /// Creates a generator from a 64-bit seed. The same seed always
    /// produces the same sequence.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A single uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// A single standard normal draw (Ziggurat via `rand_distr`).
    #[inline]
    pub fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills a pre-allocated buffer with standard normal draws.
    #[inline]
    pub fn fill_standard_normal(&mut self, buffer: &mut [f64]) {
        for slot in buffer.iter_mut() {
            *slot = StandardNormal.sample(&mut self.inner);
        }
    }
}

//! Seeded random stream for map generation
//!
//! A level's layout is reproducible from `(level id, seed)`; the stream is
//! restartable only by creating a new generator with the same seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic generator of floats in `[0, 1)`
#[derive(Debug, Clone)]
pub struct MapRng {
    inner: Pcg32,
}

impl MapRng {
    pub fn new(seed: i32) -> Self {
        Self {
            // Reinterpret the bits so negative seeds map to distinct streams
            inner: Pcg32::seed_from_u64(u64::from(seed as u32)),
        }
    }

    /// Next value in `[0, 1)`
    pub fn next(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Uniform index in `[0, len)`; `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        let i = (self.next() * len as f64) as usize;
        i.min(len.saturating_sub(1))
    }
}

//! Random sources for combat rolls
//!
//! Rolls go through a trait object owned by `GameState` so tests can pin
//! them to a fixed value.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform source of rolls in `[0, 1)`.
pub trait RandomSource {
    fn roll(&mut self) -> f64;
}

/// ChaCha8-backed generator, deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn roll(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Always returns the same roll.
///
/// `FixedRoll(-1.0)` sits below every ratio threshold, so no critical hit or
/// dodge check can succeed against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRoll(pub f64);

impl RandomSource for FixedRoll {
    fn roll(&mut self) -> f64 {
        self.0
    }
}

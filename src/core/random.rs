// src/core/random.rs

//! Injectable sources of uniform draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A generator of uniform draws in `[0, 1)`.
///
/// Every stochastic operator in the crate pulls its randomness through this
/// trait so a run can be replayed from a seed or from a fixed list of draws.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Seedable PRNG-backed source.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Deterministic source for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed cycle of draws. Values are clamped into `[0, 1)`.
#[derive(Debug, Clone)]
pub struct FixedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl FixedDraws {
    /// Cycles through `draws`; an empty list always yields 0.
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// A source that only ever yields `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedDraws {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor = (self.cursor + 1) % self.draws.len();
        clamp_unit(value)
    }
}

/// Clamps a draw into `[0, 1)`; NaN maps to 0.
pub(crate) fn clamp_unit(r: f64) -> f64 {
    if r.is_nan() || r < 0.0 {
        0.0
    } else if r >= 1.0 {
        1.0 - f64::EPSILON
    } else {
        r
    }
}

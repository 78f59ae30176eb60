// src/walk/mod.rs

//! Coined discrete-time quantum walk on a ring of columns.
//!
//! This is the computation the remote probability service performs: a walker
//! with a two-level coin starts at one column, and every step applies the
//! coin to each position before shifting coin-0 amplitude one column left
//! and coin-1 amplitude one column right (wrapping at the edges). The result
//! is the per-column probability `|a0|^2 + |a1|^2`, a vector of the same
//! shape as the field engine's own.

use crate::core::FieldError;
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use tracing::debug;

/// Coin applied at every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinType {
    /// `[[1, 1], [1, -1]] / sqrt(2)`.
    #[default]
    Hadamard,
    /// `Ry(theta)` with `theta = angles[0]`, or `pi / 6` when no angle is given.
    Biased,
    /// `Rz(phi) * Ry(theta)` with `theta = angles[0]`, `phi = angles[1]` (default 0).
    /// Falls back to Hadamard without angles.
    Custom,
}

impl CoinType {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoinType::Hadamard => "hadamard",
            CoinType::Biased => "biased",
            CoinType::Custom => "custom",
        }
    }
}

/// The 2x2 unitary for a coin.
pub fn coin_matrix(coin: CoinType, angles: &[f64]) -> [[Complex<f64>; 2]; 2] {
    match (coin, angles) {
        (CoinType::Biased, _) => ry(angles.first().copied().unwrap_or(PI / 6.0)),
        (CoinType::Custom, [theta, rest @ ..]) => {
            let phi = rest.first().copied().unwrap_or(0.0);
            let cy = ry(*theta);
            let phase = Complex::new(phi.cos(), phi.sin());
            // Rz(phi) = diag(1, e^(i*phi)) scales the second row.
            [
                [cy[0][0], cy[0][1]],
                [cy[1][0] * phase, cy[1][1] * phase],
            ]
        }
        _ => hadamard(),
    }
}

fn hadamard() -> [[Complex<f64>; 2]; 2] {
    [
        [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(FRAC_1_SQRT_2, 0.0)],
        [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(-FRAC_1_SQRT_2, 0.0)],
    ]
}

fn ry(theta: f64) -> [[Complex<f64>; 2]; 2] {
    let (sin_a, cos_a) = (theta / 2.0).sin_cos();
    [
        [Complex::new(cos_a, 0.0), Complex::new(-sin_a, 0.0)],
        [Complex::new(sin_a, 0.0), Complex::new(cos_a, 0.0)],
    ]
}

/// Runs the walk and returns the probability of finding the walker on each column.
///
/// # Errors
/// `InvalidArgument` when `width` is zero or `start` is not a column.
pub fn simulate_walk(
    width: usize,
    steps: u32,
    coin: CoinType,
    angles: &[f64],
    start: usize,
) -> Result<Vec<f64>, FieldError> {
    if width == 0 {
        return Err(FieldError::invalid("walk needs at least one column"));
    }
    if start >= width {
        return Err(FieldError::column_out_of_range("walk start", start, width));
    }

    let c = coin_matrix(coin, angles);
    // Index (pos << 1) | coin.
    let mut state = vec![Complex::<f64>::zero(); 2 * width];
    state[start << 1] = Complex::new(1.0, 0.0);

    for _ in 0..steps {
        let mut shifted = vec![Complex::zero(); 2 * width];
        for pos in 0..width {
            let a0 = state[pos << 1];
            let a1 = state[(pos << 1) | 1];
            if a0.norm_sqr() < 1e-24 && a1.norm_sqr() < 1e-24 {
                continue;
            }
            let b0 = c[0][0] * a0 + c[0][1] * a1;
            let b1 = c[1][0] * a0 + c[1][1] * a1;
            let left = (pos + width - 1) % width;
            let right = (pos + 1) % width;
            shifted[left << 1] += b0;
            shifted[(right << 1) | 1] += b1;
        }
        state = shifted;
    }

    let probabilities: Vec<f64> = (0..width)
        .map(|pos| state[pos << 1].norm_sqr() + state[(pos << 1) | 1].norm_sqr())
        .collect();
    debug!(target: "qfield::walk", width, steps, coin = coin.as_str(), start, "walk.simulated");
    Ok(probabilities)
}

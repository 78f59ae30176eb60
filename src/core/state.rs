// src/core/state.rs

use super::constants::field_constants::DEGENERATE_EPSILON;
use std::fmt;

/// An ordered set of non-negative weights, one per grid column.
///
/// The vector is created whole (on engine construction and on every row
/// reset) and then mutated in place by the engine's operators. After any
/// operator that changes its mass it is renormalized so the weights sum to 1,
/// unless every weight is zero, in which case it stays the zero vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector {
    weights: Vec<f64>,
}

impl ProbabilityVector {
    /// Wraps the given weights without normalizing them.
    pub(crate) fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Read-only access to the weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.weights.len()
    }

    /// Sum of all weights, recomputed on every call.
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// `true` when the vector carries no usable mass (all zero, or a non-finite total).
    pub fn is_degenerate(&self) -> bool {
        let total = self.total();
        !total.is_finite() || total <= DEGENERATE_EPSILON
    }

    /// Replaces any non-finite or negative weight with zero.
    pub(crate) fn sanitize(&mut self) {
        for w in self.weights.iter_mut() {
            if !w.is_finite() || *w < 0.0 {
                *w = 0.0;
            }
        }
    }

    /// Sanitizes, then divides every weight by the total.
    ///
    /// A total at or below the degenerate epsilon is treated as 1, which
    /// leaves an all-zero vector instead of producing NaN. Returns `false`
    /// in that case.
    pub(crate) fn normalize(&mut self) -> bool {
        self.sanitize();
        let mut total = self.total();
        let healthy = total > DEGENERATE_EPSILON;
        if !healthy {
            total = 1.0;
        }
        for w in self.weights.iter_mut() {
            *w /= total;
        }
        healthy
    }

    /// Index of the largest weight, lowest index on ties.
    pub fn brightest(&self) -> usize {
        let mut best = 0;
        for (i, w) in self.weights.iter().enumerate() {
            if *w > self.weights[best] {
                best = i;
            }
        }
        best
    }
}

impl fmt::Display for ProbabilityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field[")?;
        for (i, w) in self.weights.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, w)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_vector_stays_zero() {
        let mut v = ProbabilityVector::new(vec![0.0; 4]);
        assert!(!v.normalize());
        assert!(v.weights().iter().all(|w| *w == 0.0));
        assert!(v.is_degenerate());
    }

    #[test]
    fn test_normalize_scrubs_non_finite_and_negative() {
        let mut v = ProbabilityVector::new(vec![f64::NAN, 2.0, -1.0, f64::INFINITY, 2.0]);
        assert!(v.normalize());
        assert_eq!(v.weights(), &[0.0, 0.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_brightest_prefers_lowest_index() {
        let v = ProbabilityVector::new(vec![0.2, 0.4, 0.4]);
        assert_eq!(v.brightest(), 1);
    }
}

// src/validation/mod.rs

//! Checks on probability vectors: the unit-sum invariant, strict positivity
//! after a reset, and the shape rules an external vector must satisfy before
//! it can stand in for the engine's own.

use crate::core::field_constants::{DEGENERATE_EPSILON, NORM_TOLERANCE};
use crate::core::{FieldError, ProbabilityVector};

/// Checks that the weights sum to 1 within a relative tolerance (default 1e-9).
///
/// An all-zero vector is reported as `Degenerate` rather than as a
/// normalization failure, since it is the defined result of normalizing
/// a vector with no mass.
pub fn check_normalization(field: &ProbabilityVector, tolerance: Option<f64>) -> Result<(), FieldError> {
    let tolerance = tolerance.unwrap_or(NORM_TOLERANCE);
    if field.is_degenerate() {
        return Err(FieldError::degenerate("vector carries no mass"));
    }
    let total = field.total();
    if (total - 1.0).abs() > tolerance * total.abs().max(1.0) {
        return Err(FieldError::degenerate(format!(
            "normalization failed: sum = {} (deviation > {})",
            total, tolerance
        )));
    }
    Ok(())
}

/// Checks that every column is still reachable by sampling.
pub fn check_strictly_positive(field: &ProbabilityVector) -> Result<(), FieldError> {
    match field.weights().iter().position(|w| !(*w > 0.0)) {
        Some(column) => Err(FieldError::degenerate(format!(
            "column {} has weight {}",
            column,
            field.weights()[column]
        ))),
        None => Ok(()),
    }
}

/// Shape rules for a replacement vector: exact length, finite, non-negative.
pub fn check_drop_in(weights: &[f64], width: usize) -> Result<(), FieldError> {
    if weights.len() != width {
        return Err(FieldError::invalid(format!(
            "replacement vector has {} entries, field width is {}",
            weights.len(),
            width
        )));
    }
    if let Some((i, w)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite() || **w < 0.0) {
        return Err(FieldError::invalid(format!("replacement weight {} at column {} is not a finite non-negative number", w, i)));
    }
    Ok(())
}

/// Full acceptance test for a vector delivered by the remote service:
/// the drop-in shape rules plus a usable total.
pub fn validate_distribution(weights: &[f64], width: usize) -> Result<(), FieldError> {
    check_drop_in(weights, width)?;
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= DEGENERATE_EPSILON {
        return Err(FieldError::degenerate(format!("replacement vector sums to {}", total)));
    }
    Ok(())
}

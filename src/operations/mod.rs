// src/operations/mod.rs

//! Operators over the probability field expressed as data.
//!
//! [`Operation`] mirrors the engine's own methods so a sequence of them can
//! be recorded, displayed and replayed through a [`Schedule`](crate::Schedule).
//! [`EnvironmentEffect`] is the fixed set of effects the surrounding game
//! applies once per turn, grouped in an [`Environment`].

mod environment;

pub use environment::{Environment, EnvironmentEffect};

use serde::{Deserialize, Serialize};

/// One step that can be applied to a field engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Replace the vector with a fresh distribution peaked at `origin`.
    Reset {
        /// Seed column (clamped if past the last column).
        origin: usize,
    },

    /// Global blend toward fresh random values.
    ///
    /// Analogy: a Hadamard applied to every column at once.
    Mix {
        /// Blend weight of the random values, in `[0, 1]`.
        intensity: f64,
    },

    /// Pull one column toward the mean of its ring neighbourhood.
    LocalInterference {
        /// Target column.
        column: usize,
        /// Blend weight of the neighbourhood mean, in `[0, 1]`.
        intensity: f64,
    },

    /// Damp one column by a factor drawn from `[min_factor, max_factor]`.
    PhaseShift {
        /// Target column.
        column: usize,
        /// Lower bound of the factor.
        min_factor: f64,
        /// Upper bound of the factor, at most 1.
        max_factor: f64,
    },

    /// Transfer part of one column's weight to another. Sum-preserving.
    Leak {
        /// Column losing weight.
        source: usize,
        /// Column gaining weight.
        target: usize,
        /// Share of the source weight moved.
        fraction: f64,
    },

    /// Keep only `retention` of one column's weight, without renormalizing.
    Decohere {
        /// Target column.
        column: usize,
        /// Share of the weight kept.
        retention: f64,
    },

    /// Add uniform noise of the given magnitude to every column.
    Fluctuate {
        /// Upper bound of the per-column noise.
        magnitude: f64,
    },

    /// Explicit renormalization, used after a batch of `Decohere`.
    Normalize,

    /// Collapse the field and score the outcome against `target`.
    Measure {
        /// Column the collapse is judged against.
        target: usize,
    },
}

impl Operation {
    /// Columns the operation names explicitly. Global operations name none.
    pub fn involved_columns(&self) -> Vec<usize> {
        match self {
            Operation::Reset { origin } => vec![*origin],
            Operation::LocalInterference { column, .. } => vec![*column],
            Operation::PhaseShift { column, .. } => vec![*column],
            Operation::Leak { source, target, .. } => vec![*source, *target],
            Operation::Decohere { column, .. } => vec![*column],
            Operation::Measure { target } => vec![*target],
            Operation::Mix { .. } | Operation::Fluctuate { .. } | Operation::Normalize => Vec::new(),
        }
    }

    /// Short label used in schedule listings.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Reset { .. } => "R",
            Operation::Mix { .. } => "H*",
            Operation::LocalInterference { .. } => "H",
            Operation::PhaseShift { .. } => "P",
            Operation::Leak { .. } => "L",
            Operation::Decohere { .. } => "D",
            Operation::Fluctuate { .. } => "V",
            Operation::Normalize => "N",
            Operation::Measure { .. } => "M",
        }
    }
}

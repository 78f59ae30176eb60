// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod random;
pub mod state;

pub use error::FieldError;
pub use random::{FixedDraws, RandomSource, SeededSource};
pub use state::ProbabilityVector;

pub mod constants;
pub use constants::field_constants;

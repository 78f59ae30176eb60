// src/simulation/mod.rs

//! The field engine and the runner that drives it through a [`Schedule`].

mod results;
pub(crate) mod engine;

pub use engine::FieldEngine;
pub use results::{Measurement, SimulationResult};

use crate::core::{FieldError, RandomSource};
use crate::operations::Operation;
use crate::schedule::Schedule;
use tracing::debug;

/// Runs schedules against a field engine and collects the measurements.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    coherence_radius: usize,
}

impl Simulator {
    /// Simulator judging collapses with an exact-match rule (radius 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept collapses up to `radius` columns away from the target as coherent.
    pub fn with_coherence_radius(mut self, radius: usize) -> Self {
        self.coherence_radius = radius;
        self
    }

    /// Applies the schedule's operations in order.
    ///
    /// Every `Measure` samples the engine once, without resetting it, and
    /// records a [`Measurement`] holding a snapshot of the sampled vector.
    ///
    /// # Errors
    /// The first `FieldError` raised by an operation; earlier operations stay applied.
    pub fn run<R: RandomSource>(
        &self,
        engine: &mut FieldEngine<R>,
        schedule: &Schedule,
    ) -> Result<SimulationResult, FieldError> {
        let mut result = SimulationResult::new();
        for op in schedule.operations() {
            match op {
                Operation::Measure { target } => {
                    if *target >= engine.width() {
                        return Err(FieldError::column_out_of_range("measure target", *target, engine.width()));
                    }
                    let probabilities = engine.weights().to_vec();
                    let collapse = engine.sample();
                    let measurement = Measurement::judge(collapse, *target, self.coherence_radius, probabilities);
                    debug!(target: "qfield::engine", collapse, target_column = *target, coherent = measurement.is_coherent(), "field.measure");
                    result.record(measurement);
                }
                _ => engine.apply_operation(op)?,
            }
        }
        Ok(result)
    }
}

// src/operations/environment.rs

use crate::core::{FieldError, RandomSource};
use crate::simulation::FieldEngine;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// An effect the game world applies to the field every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvironmentEffect {
    /// Decoherence field: the column keeps only `retention` of its weight.
    DecoField {
        /// Affected column.
        column: usize,
        /// Share of the weight kept, in `[0, 1]`.
        retention: f64,
    },
    /// Portal: leaks `fraction` of the `from` column into the `to` column.
    Portal {
        /// Column losing weight.
        from: usize,
        /// Column gaining weight.
        to: usize,
        /// Share moved, in `[0, 1]`.
        fraction: f64,
    },
    /// Random uplift of every column by up to `magnitude`.
    VacuumFluctuation {
        /// Upper bound of the per-column noise.
        magnitude: f64,
    },
}

impl EnvironmentEffect {
    fn columns(&self) -> Vec<usize> {
        match self {
            EnvironmentEffect::DecoField { column, .. } => vec![*column],
            EnvironmentEffect::Portal { from, to, .. } => vec![*from, *to],
            EnvironmentEffect::VacuumFluctuation { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for EnvironmentEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentEffect::DecoField { column, retention } => write!(f, "DecoField(col {}, keep {:.2})", column, retention),
            EnvironmentEffect::Portal { from, to, fraction } => write!(f, "Portal({} -> {}, {:.2})", from, to, fraction),
            EnvironmentEffect::VacuumFluctuation { magnitude } => write!(f, "VacuumFluctuation({:.3})", magnitude),
        }
    }
}

/// The set of environment effects active for a row.
///
/// Effects resolve in a fixed order regardless of insertion:
/// 1. every `DecoField`, followed by a single renormalization,
/// 2. every `Portal`, in insertion order,
/// 3. every `VacuumFluctuation`, in insertion order,
/// 4. a final renormalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    effects: Vec<EnvironmentEffect>,
}

impl Environment {
    /// An environment with no effects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an effect.
    pub fn add_effect(&mut self, effect: EnvironmentEffect) {
        self.effects.push(effect);
    }

    /// Builder-style [`add_effect`](Self::add_effect).
    pub fn with_effect(mut self, effect: EnvironmentEffect) -> Self {
        self.add_effect(effect);
        self
    }

    /// Effects in insertion order.
    pub fn effects(&self) -> &[EnvironmentEffect] {
        &self.effects
    }

    /// `true` when no effects are registered.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Checks every referenced column against `width`.
    pub fn validate(&self, width: usize) -> Result<(), FieldError> {
        for effect in &self.effects {
            if let Some(column) = effect.columns().into_iter().find(|c| *c >= width) {
                return Err(FieldError::column_out_of_range(&effect.to_string(), column, width));
            }
        }
        Ok(())
    }

    /// Applies all effects to `engine` in the documented order.
    ///
    /// Columns are validated up front, so an invalid environment leaves the
    /// engine untouched.
    pub fn apply<R: RandomSource>(&self, engine: &mut FieldEngine<R>) -> Result<(), FieldError> {
        if self.effects.is_empty() {
            return Ok(());
        }
        self.validate(engine.width())?;

        let mut decohered = false;
        for effect in &self.effects {
            if let EnvironmentEffect::DecoField { column, retention } = effect {
                engine.decohere(*column, *retention)?;
                decohered = true;
            }
        }
        if decohered {
            engine.normalize();
        }

        for effect in &self.effects {
            if let EnvironmentEffect::Portal { from, to, fraction } = effect {
                engine.leak(*from, *to, *fraction)?;
            }
        }

        for effect in &self.effects {
            if let EnvironmentEffect::VacuumFluctuation { magnitude } = effect {
                engine.fluctuate(*magnitude);
            }
        }

        engine.normalize();
        trace!(target: "qfield::engine", effects = self.effects.len(), "environment.applied");
        Ok(())
    }
}

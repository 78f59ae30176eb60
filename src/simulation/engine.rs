// src/simulation/engine.rs
use crate::core::field_constants::{
    DEFAULT_WIDTH, DEGENERATE_EPSILON, DIFFICULTY_SCALE, JITTER_MAX, MAX_DIFFICULTY, MIX_CEIL,
    MIX_FLOOR, PHASE_FACTOR_MAX, PHASE_FACTOR_MIN, RESET_DECAY,
};
use crate::core::random::clamp_unit;
use crate::core::{FieldError, ProbabilityVector, RandomSource, SeededSource};
use crate::operations::Operation;
use crate::validation::check_drop_in;
use tracing::{debug, trace, warn};

/// The field engine: one probability vector over the grid columns plus the
/// operators that perturb and collapse it.
///
/// The engine owns its random source so that every stochastic operator
/// (reset jitter, mixing, phase factors, fluctuations, sampling) draws from
/// the same injectable stream. A run is reproducible from the source alone.
///
/// All operators run to completion synchronously; the engine is not meant
/// to be shared between threads or re-entered from an operator.
#[derive(Debug, Clone)]
pub struct FieldEngine<R: RandomSource = SeededSource> {
    field: ProbabilityVector,
    difficulty: f64,
    source: R,
}

impl FieldEngine<SeededSource> {
    /// Engine backed by a `StdRng` seeded with `seed`.
    pub fn seeded(width: usize, difficulty: f64, seed: u64) -> Result<Self, FieldError> {
        Self::new(width, difficulty, SeededSource::from_seed(seed))
    }
}

impl Default for FieldEngine<SeededSource> {
    fn default() -> Self {
        let mut engine = Self {
            field: ProbabilityVector::new(vec![0.0; DEFAULT_WIDTH]),
            difficulty: 0.0,
            source: SeededSource::from_entropy(),
        };
        engine.reset(0);
        engine
    }
}

impl<R: RandomSource> FieldEngine<R> {
    /// Creates an engine of `width` columns seeded at column 0.
    ///
    /// `difficulty` is clamped into `[0, MAX_DIFFICULTY]` so the reset
    /// distribution stays strictly positive.
    ///
    /// # Errors
    /// `FieldError::InvalidArgument` when `width` is zero.
    pub fn new(width: usize, difficulty: f64, source: R) -> Result<Self, FieldError> {
        if width == 0 {
            warn!(target: "qfield::engine", "field.new.zero_width");
            return Err(FieldError::invalid("field width must be at least 1"));
        }
        let clamped = if difficulty.is_nan() { 0.0 } else { difficulty.clamp(0.0, MAX_DIFFICULTY) };
        if clamped != difficulty {
            debug!(target: "qfield::engine", requested = difficulty, applied = clamped, "field.new.difficulty_clamped");
        }
        let mut engine = Self {
            field: ProbabilityVector::new(vec![0.0; width]),
            difficulty: clamped,
            source,
        };
        engine.reset(0);
        Ok(engine)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.field.width()
    }

    /// Difficulty after clamping.
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Current weights, for rendering and estimation.
    pub fn weights(&self) -> &[f64] {
        self.field.weights()
    }

    /// Current vector.
    pub fn field(&self) -> &ProbabilityVector {
        &self.field
    }

    /// `true` when the vector has collapsed to all zeros.
    pub fn is_degenerate(&self) -> bool {
        self.field.is_degenerate()
    }

    /// Replaces the vector with a fresh distribution peaked at `origin`.
    ///
    /// `w[i] = exp(-0.6 * |i - origin|) * (1 - difficulty * 0.05) + jitter(i)`
    /// with `jitter(i)` drawn in `[0, 0.05)` in column order, then normalized.
    /// An origin past the last column is clamped to it and logged.
    pub fn reset(&mut self, origin: usize) {
        let width = self.width();
        let origin = if origin >= width {
            warn!(target: "qfield::engine", origin, width, "field.reset.origin_clamped");
            width - 1
        } else {
            origin
        };
        let peak = 1.0 - self.difficulty * DIFFICULTY_SCALE;
        let source = &mut self.source;
        let weights = (0..width)
            .map(|i| {
                let distance = i.abs_diff(origin) as f64;
                (-RESET_DECAY * distance).exp() * peak + source.next_unit() * JITTER_MAX
            })
            .collect();
        self.field = ProbabilityVector::new(weights);
        self.field.normalize();
        debug!(target: "qfield::engine", origin, "field.reset");
    }

    /// Renormalizes the vector so it sums to 1.
    ///
    /// Non-finite and negative weights are zeroed first. An all-zero vector
    /// is left as is and `false` is returned.
    pub fn normalize(&mut self) -> bool {
        let healthy = self.field.normalize();
        if !healthy {
            debug!(target: "qfield::engine", "field.normalize.degenerate");
        }
        healthy
    }

    /// Blends every weight toward fresh uniform values in `(0.05, 0.95]`.
    pub fn mix(&mut self, intensity: f64) {
        let t = clamp_fraction(intensity);
        let source = &mut self.source;
        for w in self.field.weights_mut() {
            let noise = MIX_CEIL - (MIX_CEIL - MIX_FLOOR) * source.next_unit();
            *w = *w * (1.0 - t) + noise * t;
        }
        self.field.normalize();
        trace!(target: "qfield::engine", intensity = t, "field.mix");
    }

    /// Pulls one column toward the mean of itself and its two ring neighbours.
    ///
    /// Column 0 and column `width - 1` are neighbours. Only `column` changes
    /// before the renormalization.
    pub fn local_interference(&mut self, column: usize, intensity: f64) -> Result<(), FieldError> {
        self.check_column("interference", column)?;
        let t = clamp_fraction(intensity);
        let n = self.width();
        let left = (column + n - 1) % n;
        let right = (column + 1) % n;
        let w = self.field.weights_mut();
        let avg = (w[left] + w[column] + w[right]) / 3.0;
        w[column] = w[column] * (1.0 - t) + avg * t;
        self.field.normalize();
        Ok(())
    }

    /// Damps one column by a factor drawn from `[0.88, 0.98]`. Returns the factor.
    pub fn phase_shift(&mut self, column: usize) -> Result<f64, FieldError> {
        self.phase_shift_within(column, PHASE_FACTOR_MIN, PHASE_FACTOR_MAX)
    }

    /// Damps one column by a factor drawn uniformly from `[min_factor, max_factor]`.
    ///
    /// # Errors
    /// `InvalidArgument` for a bad column or unless `0 <= min <= max <= 1`.
    pub fn phase_shift_within(
        &mut self,
        column: usize,
        min_factor: f64,
        max_factor: f64,
    ) -> Result<f64, FieldError> {
        self.check_column("phase shift", column)?;
        if !(0.0 <= min_factor && min_factor <= max_factor && max_factor <= 1.0) {
            warn!(target: "qfield::engine", min_factor, max_factor, "field.phase_shift.bad_range");
            return Err(FieldError::invalid(format!(
                "phase factor range [{}, {}] must lie within [0, 1] and be ordered",
                min_factor, max_factor
            )));
        }
        let factor = min_factor + (max_factor - min_factor) * self.source.next_unit();
        self.scale_column(column, factor);
        Ok(factor)
    }

    /// Damps one column by a fixed factor, clamped into `[0, 1]`.
    pub fn phase_shift_by(&mut self, column: usize, factor: f64) -> Result<(), FieldError> {
        self.check_column("phase shift", column)?;
        self.scale_column(column, clamp_fraction(factor));
        Ok(())
    }

    fn scale_column(&mut self, column: usize, factor: f64) {
        self.field.weights_mut()[column] *= factor;
        self.field.normalize();
    }

    /// Moves `fraction` of the source column's weight onto the target column.
    ///
    /// The total is preserved, so no renormalization happens. Returns the
    /// amount transferred. `fraction` is clamped into `[0, 1]`.
    pub fn leak(&mut self, source: usize, target: usize, fraction: f64) -> Result<f64, FieldError> {
        self.check_column("leak source", source)?;
        self.check_column("leak target", target)?;
        if source == target {
            return Ok(0.0);
        }
        let fraction = clamp_fraction(fraction);
        let w = self.field.weights_mut();
        let mut transfer = w[source] * fraction;
        if !transfer.is_finite() || transfer < 0.0 {
            transfer = 0.0;
        }
        w[source] = (w[source] - transfer).max(0.0);
        w[target] += transfer;
        Ok(transfer)
    }

    /// Keeps `retention` of one column's weight. Does not renormalize: apply
    /// all decoherence for a tick, then call [`normalize`](Self::normalize) once.
    pub fn decohere(&mut self, column: usize, retention: f64) -> Result<(), FieldError> {
        self.check_column("decoherence", column)?;
        let retention = clamp_fraction(retention);
        let w = self.field.weights_mut();
        w[column] *= retention;
        if !w[column].is_finite() {
            w[column] = 0.0;
        }
        Ok(())
    }

    /// Adds `magnitude * u` to every column, `u` uniform per column, then normalizes.
    pub fn fluctuate(&mut self, magnitude: f64) {
        let magnitude = if magnitude.is_finite() { magnitude.max(0.0) } else { 0.0 };
        let source = &mut self.source;
        for w in self.field.weights_mut() {
            *w += magnitude * source.next_unit();
        }
        self.field.normalize();
    }

    /// Collapses the field with one draw from the engine's source.
    /// The vector is not modified.
    pub fn sample(&mut self) -> usize {
        let r = self.source.next_unit();
        self.sample_with(r)
    }

    /// Cumulative selection for a given draw `r` in `[0, 1)`.
    ///
    /// Returns the first column with positive weight whose running sum
    /// reaches `r * total`, with the total recomputed here. A zero-weight
    /// column is never chosen. Rounding that leaves no column selected yields
    /// the last column with positive weight. A vector without usable mass
    /// falls back to the uniform choice `floor(r * width)`.
    pub fn sample_with(&self, r: f64) -> usize {
        let r = clamp_unit(r);
        let weights = self.field.weights();
        let n = weights.len();
        let total: f64 = weights.iter().map(|w| usable(*w)).sum();
        if !total.is_finite() || total <= DEGENERATE_EPSILON {
            let column = ((r * n as f64) as usize).min(n - 1);
            debug!(target: "qfield::engine", column, "field.sample.uniform_fallback");
            return column;
        }
        let threshold = r * total;
        let mut cumulative = 0.0;
        let mut last_live = n - 1;
        for (i, w) in weights.iter().enumerate() {
            let w = usable(*w);
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last_live = i;
            if cumulative >= threshold {
                return i;
            }
        }
        last_live
    }

    /// Column with the largest weight; lowest index wins ties.
    pub fn brightest(&self) -> usize {
        self.field.brightest()
    }

    /// Adopts an externally computed vector of the same width, normalizing it.
    ///
    /// # Errors
    /// `InvalidArgument` on a length mismatch or any negative or non-finite entry;
    /// the current vector is kept in that case.
    pub fn replace_weights(&mut self, weights: Vec<f64>) -> Result<(), FieldError> {
        if let Err(err) = check_drop_in(&weights, self.width()) {
            warn!(target: "qfield::engine", error = %err, "field.replace.rejected");
            return Err(err);
        }
        self.field = ProbabilityVector::new(weights);
        self.field.normalize();
        Ok(())
    }

    /// Applies one non-measuring operation.
    ///
    /// `Measure` is rejected here; measuring belongs to the caller (the
    /// [`Simulator`](crate::Simulator) or a game session) because it produces a result.
    pub fn apply_operation(&mut self, op: &Operation) -> Result<(), FieldError> {
        match op {
            Operation::Reset { origin } => self.reset(*origin),
            Operation::Mix { intensity } => self.mix(*intensity),
            Operation::LocalInterference { column, intensity } => self.local_interference(*column, *intensity)?,
            Operation::PhaseShift { column, min_factor, max_factor } => {
                self.phase_shift_within(*column, *min_factor, *max_factor)?;
            }
            Operation::Leak { source, target, fraction } => {
                self.leak(*source, *target, *fraction)?;
            }
            Operation::Decohere { column, retention } => self.decohere(*column, *retention)?,
            Operation::Fluctuate { magnitude } => self.fluctuate(*magnitude),
            Operation::Normalize => {
                self.normalize();
            }
            Operation::Measure { .. } => {
                return Err(FieldError::invalid("Measure must be handled by the caller, not passed to apply_operation"));
            }
        }
        Ok(())
    }

    fn check_column(&self, what: &str, column: usize) -> Result<(), FieldError> {
        let width = self.width();
        if column >= width {
            warn!(target: "qfield::engine", operation = what, column, width, "field.column_out_of_range");
            return Err(FieldError::column_out_of_range(what, column, width));
        }
        Ok(())
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn usable(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 { w } else { 0.0 }
}

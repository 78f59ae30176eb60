//! Constants shaping the field operators.

/// Tunable constants of the probability field.
pub mod field_constants {
    /// Exponential decay applied per column of distance from the reset origin.
    pub const RESET_DECAY: f64 = 0.6;
    /// How strongly difficulty flattens the reset peak.
    pub const DIFFICULTY_SCALE: f64 = 0.05;
    /// Upper bound (exclusive) of the non-negative reset jitter.
    pub const JITTER_MAX: f64 = 0.05;
    /// Highest accepted difficulty; keeps `1 - difficulty * DIFFICULTY_SCALE` at 0.05 or above.
    pub const MAX_DIFFICULTY: f64 = 19.0;
    /// Totals at or below this are treated as an all-zero vector.
    pub const DEGENERATE_EPSILON: f64 = 1e-12;
    /// Relative tolerance for the unit-sum post-condition.
    pub const NORM_TOLERANCE: f64 = 1e-9;
    /// Default blend used by `mix` and `local_interference`.
    pub const DEFAULT_INTENSITY: f64 = 0.5;
    /// Lower edge of the random values `mix` blends in (exclusive).
    pub const MIX_FLOOR: f64 = 0.05;
    /// Upper edge of the random values `mix` blends in (inclusive).
    pub const MIX_CEIL: f64 = 0.95;
    /// Default factor range drawn by `phase_shift`.
    pub const PHASE_FACTOR_MIN: f64 = 0.88;
    /// See [`PHASE_FACTOR_MIN`].
    pub const PHASE_FACTOR_MAX: f64 = 0.98;
    /// Grid width used by the game.
    pub const DEFAULT_WIDTH: usize = 8;
}

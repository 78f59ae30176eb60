// src/lib.rs

//! `qfield` - A probability-field engine for a column-collapse puzzle game
//!
//! The engine keeps one normalized vector of non-negative weights over the
//! columns of a grid, perturbs it with a small set of operators (mixing,
//! local interference, phase damping, portal leakage, decoherence) and
//! collapses it to a single column under a reproducible sampling law.
//! Around it sit the pieces a game needs: environment effects applied per
//! turn, a coined quantum walk that can stand in for the local vector, a
//! cancellable remote lookup, and row/turn bookkeeping.
//!
//! The weights are classical intensities, not complex amplitudes.

pub mod core;
pub mod operations;
pub mod schedule;
pub mod simulation;
pub mod validation;
pub mod walk;
pub mod remote;
pub mod game;

pub use core::{FieldError, FixedDraws, ProbabilityVector, RandomSource, SeededSource};
pub use operations::{Environment, EnvironmentEffect, Operation};
pub use schedule::{Schedule, ScheduleBuilder};
pub use simulation::{FieldEngine, Measurement, SimulationResult, Simulator};
pub use validation::{check_drop_in, check_normalization, check_strictly_positive, validate_distribution};
pub use walk::{simulate_walk, CoinType};
pub use remote::{LocalWalkService, ProbabilityService, RemoteError, WalkReply, WalkRequest};
pub use game::{GameConfig, GameState, GameStatus, Session, TurnOutcome};

// Example 1: Reset, damp, collapse
// A row seeded at column 3, its peak damped by a fixed factor, then
// collapsed with the draw r = 0. The lowest column whose running sum
// reaches the threshold wins, so the outcome is column 0.
/// ```
/// use qfield::{FieldEngine, FieldError};
///
/// let mut engine = FieldEngine::seeded(8, 0.0, 7)?;
/// engine.reset(3);
/// assert_eq!(engine.brightest(), 3);
///
/// engine.phase_shift_by(3, 0.9)?;
/// let total: f64 = engine.weights().iter().sum();
/// assert!((total - 1.0).abs() < 1e-9);
///
/// assert_eq!(engine.sample_with(0.0), 0);
/// # Ok::<(), FieldError>(())
/// ```
#[doc(hidden)]
const _: () = ();

// Example 2: A scripted turn
// A portal moves half of column 3 onto column 0, then the field is measured
// against column 1 with a one-column tolerance.
/// ```
/// use qfield::{FieldEngine, FieldError, FixedDraws, Operation, ScheduleBuilder, Simulator};
///
/// let mut engine = FieldEngine::new(4, 0.0, FixedDraws::constant(0.45))?;
/// engine.replace_weights(vec![0.1, 0.2, 0.3, 0.4])?;
///
/// let schedule = ScheduleBuilder::new()
///     .add_op(Operation::Leak { source: 3, target: 0, fraction: 0.5 })
///     .add_op(Operation::Measure { target: 1 })
///     .build();
/// println!("{}", schedule);
///
/// let result = Simulator::new().with_coherence_radius(1).run(&mut engine, &schedule)?;
/// // [0.3, 0.2, 0.3, 0.2]; threshold 0.45 is first reached at column 1.
/// let m = result.last().expect("one measurement");
/// assert_eq!(m.collapse(), 1);
/// assert_eq!(m.mirror(), 2);
/// assert!(m.is_coherent());
/// # Ok::<(), FieldError>(())
/// ```
#[doc(hidden)]
const _: () = ();

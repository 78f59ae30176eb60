use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::GameConfig;
use super::state::{GameState, GameStatus};
use crate::core::{FieldError, RandomSource, SeededSource};
use crate::remote::{spawn_lookup, PendingLookup, ProbabilityService, RemoteError, WalkRequest};
use crate::simulation::{FieldEngine, Measurement};

/// Result of one resolved turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Row the collapse happened on.
    pub row: usize,
    /// The collapse, judged against player A's column.
    pub measurement: Measurement,
    /// Status after the turn was scored.
    pub status: GameStatus,
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} -> {:?}", self.row, self.measurement, self.status)
    }
}

/// What happened to the remote lookup on the last poll.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteStatus {
    /// No lookup in flight.
    Idle,
    /// Still waiting; the local vector stays in use.
    Pending,
    /// The remote vector replaced the local one.
    Adopted,
    /// The lookup failed; the local vector stays in use.
    FellBack(RemoteError),
}

/// One game: configuration, bookkeeping, the row's field engine, and at most
/// one remote lookup in flight.
///
/// Every row transition cancels the pending lookup before the engine is
/// reset, so a reply computed for an old row can never land on a new one.
pub struct Session<R: RandomSource = SeededSource> {
    config: GameConfig,
    state: GameState,
    engine: FieldEngine<R>,
    service: Option<Arc<dyn ProbabilityService>>,
    pending: Option<PendingLookup>,
}

impl Session<SeededSource> {
    /// Session seeded from `config.seed`, or from the OS when unset.
    pub fn new(config: GameConfig) -> Result<Self, FieldError> {
        let source = match config.seed {
            Some(seed) => SeededSource::from_seed(seed),
            None => SeededSource::from_entropy(),
        };
        Self::with_source(config, source)
    }
}

impl<R: RandomSource> Session<R> {
    /// Session drawing all randomness from `source`.
    pub fn with_source(config: GameConfig, source: R) -> Result<Self, FieldError> {
        config.validate()?;
        let engine = FieldEngine::new(config.width, config.difficulty, source)?;
        let state = GameState::new(&config);
        info!(target: "qfield::game", width = config.width, rows = config.rows, lives = config.lives, "game.session.start");
        Ok(Self {
            config,
            state,
            engine,
            service: None,
            pending: None,
        })
    }

    /// Attaches a remote probability service.
    pub fn with_service(mut self, service: Arc<dyn ProbabilityService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine(&self) -> &FieldEngine<R> {
        &self.engine
    }

    /// Current weights, for rendering.
    pub fn weights(&self) -> &[f64] {
        self.engine.weights()
    }

    /// Column to highlight as the most likely collapse.
    pub fn brightest(&self) -> usize {
        self.engine.brightest()
    }

    /// Moves player A by `delta` columns, clamped to the grid. Player B
    /// moves the opposite way by construction. Returns A's new column.
    pub fn move_player(&mut self, delta: isize) -> usize {
        let last = self.config.width as isize - 1;
        let column = (self.state.player_column as isize).saturating_add(delta).clamp(0, last);
        self.state.player_column = column as usize;
        self.state.player_column
    }

    /// Places player A on `column`.
    pub fn set_player_column(&mut self, column: usize) -> Result<(), FieldError> {
        if column >= self.config.width {
            warn!(target: "qfield::game", column, "game.player.out_of_range");
            return Err(FieldError::column_out_of_range("player", column, self.config.width));
        }
        self.state.player_column = column;
        Ok(())
    }

    /// The player's gate: a global mix followed by the row's environment effects.
    ///
    /// A lookup still in flight was computed for the ungated row, so it is
    /// cancelled first and can no longer replace the gated vector.
    pub fn apply_gate(&mut self) -> Result<(), FieldError> {
        self.ensure_playing()?;
        self.cancel_remote();
        self.engine.mix(self.config.mix_intensity);
        self.config.environment.apply(&mut self.engine)
    }

    /// Collapses the field, scores the turn and moves to the next row.
    ///
    /// # Errors
    /// `InvalidArgument` when the game is already over.
    pub fn collapse(&mut self) -> Result<TurnOutcome, FieldError> {
        self.ensure_playing()?;
        self.cancel_remote();

        let row = self.state.row;
        let probabilities = self.engine.weights().to_vec();
        let collapse = self.engine.sample();
        let measurement = Measurement::judge(collapse, self.state.player_column, self.config.coherence_radius, probabilities);

        if measurement.is_coherent() {
            self.state.record_coherent(self.config.streak_bonus);
        } else {
            self.state.record_decoherent();
        }
        self.state.time_left = self.config.turn_timer_secs;

        if self.state.advance(self.config.rows, collapse) {
            self.engine.reset(collapse);
        }

        info!(
            target: "qfield::game",
            row,
            collapse,
            target_column = measurement.target(),
            coherent = measurement.is_coherent(),
            score = self.state.score,
            lives = self.state.lives,
            "game.turn.resolved"
        );
        Ok(TurnOutcome { row, measurement, status: self.state.status })
    }

    /// Advances the turn timer. When it runs out the gate is applied and the
    /// field collapsed automatically.
    pub fn tick(&mut self, seconds: u32) -> Result<Option<TurnOutcome>, FieldError> {
        if self.state.is_over() {
            return Ok(None);
        }
        self.state.time_left = self.state.time_left.saturating_sub(seconds);
        if self.state.time_left > 0 {
            return Ok(None);
        }
        debug!(target: "qfield::game", row = self.state.row, "game.timer.expired");
        self.apply_gate()?;
        self.collapse().map(Some)
    }

    /// Starts a remote lookup for the current row, cancelling any older one.
    ///
    /// Returns `false`, leaving the local vector in charge, when remote
    /// lookups are disabled, no service is attached, the game is over, or
    /// there is no Tokio runtime to run the lookup on.
    pub fn request_remote(&mut self) -> bool {
        if !self.config.remote.enabled || self.state.is_over() {
            return false;
        }
        let Some(service) = self.service.clone() else {
            return false;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(target: "qfield::remote", "remote.lookup.no_runtime");
            return false;
        }
        self.cancel_remote();
        let request = WalkRequest::new(self.config.width, self.state.row_origin)
            .with_steps(self.config.remote.steps)
            .with_coin(self.config.remote.coin, self.config.remote.custom_coin_angles.clone());
        self.pending = Some(spawn_lookup(service, request, self.config.remote_timeout()));
        true
    }

    /// `true` while a lookup is in flight.
    pub fn has_pending_remote(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking: adopts the remote vector if it has arrived.
    pub fn poll_remote(&mut self) -> RemoteStatus {
        let Some(pending) = self.pending.as_mut() else {
            return RemoteStatus::Idle;
        };
        match pending.try_take() {
            None => RemoteStatus::Pending,
            Some(outcome) => {
                self.pending = None;
                self.settle_remote(outcome)
            }
        }
    }

    /// Waits for the pending lookup, then adopts or falls back.
    pub async fn await_remote(&mut self) -> RemoteStatus {
        let Some(pending) = self.pending.take() else {
            return RemoteStatus::Idle;
        };
        let outcome = pending.resolve().await;
        self.settle_remote(outcome)
    }

    /// Drops the pending lookup, if any.
    pub fn cancel_remote(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            pending.cancel();
        }
    }

    fn settle_remote(&mut self, outcome: Result<Vec<f64>, RemoteError>) -> RemoteStatus {
        let adopted = outcome.and_then(|probabilities| {
            self.engine
                .replace_weights(probabilities)
                .map_err(|err| RemoteError::Malformed { message: err.to_string() })
        });
        match adopted {
            Ok(()) => {
                debug!(target: "qfield::remote", row = self.state.row, "remote.lookup.adopted");
                RemoteStatus::Adopted
            }
            Err(err) => {
                warn!(target: "qfield::remote", row = self.state.row, error = %err, "remote.lookup.fallback");
                RemoteStatus::FellBack(err)
            }
        }
    }

    fn ensure_playing(&self) -> Result<(), FieldError> {
        if self.state.is_over() {
            return Err(FieldError::invalid(format!("game is over ({:?})", self.state.status)));
        }
        Ok(())
    }
}

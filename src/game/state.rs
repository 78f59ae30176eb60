use serde::Serialize;
use std::fmt;

use super::config::GameConfig;

/// Whether the game is still running and how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Score, lives, turn and row bookkeeping for one game.
///
/// Owned by the [`Session`](super::Session); the field engine never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Zero-based index of the row being played.
    pub row: usize,
    /// Column the current row's distribution was seeded from.
    pub row_origin: usize,
    /// Misses left before the game is lost.
    pub lives: u32,
    /// Points earned so far.
    pub score: u64,
    /// Consecutive hits; resets on a miss.
    pub streak: u64,
    /// Seconds left on the turn timer.
    pub time_left: u32,
    /// Player A's column; player B stands on the mirrored column.
    pub player_column: usize,
    /// Playing, won or lost.
    pub status: GameStatus,
}

impl GameState {
    /// Fresh state on row 0 with full lives and timer.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            row: 0,
            row_origin: 0,
            lives: config.lives,
            score: 0,
            streak: 0,
            time_left: config.turn_timer_secs,
            player_column: 0,
            status: GameStatus::Playing,
        }
    }

    /// `true` once the game is won or lost.
    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }

    /// Player B's column: the mirror of player A's.
    pub fn mirror_column(&self, width: usize) -> usize {
        width.saturating_sub(1).saturating_sub(self.player_column)
    }

    /// Coherent collapse: the streak grows and pays `bonus * streak`.
    pub(crate) fn record_coherent(&mut self, bonus: u64) {
        self.streak += 1;
        self.score += bonus * self.streak;
    }

    /// Decoherent collapse: a life is lost and the streak resets.
    pub(crate) fn record_decoherent(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.streak = 0;
    }

    /// Ends the game or moves to the next row. Returns `true` when a new row starts.
    pub(crate) fn advance(&mut self, rows: usize, origin: usize) -> bool {
        if self.lives == 0 {
            self.status = GameStatus::Lost;
            return false;
        }
        self.row += 1;
        if self.row >= rows {
            self.status = GameStatus::Won;
            return false;
        }
        self.row_origin = origin;
        true
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} | lives {} | score {} | streak {} | timer {} | {:?}",
            self.row, self.lives, self.score, self.streak, self.time_left, self.status
        )
    }
}

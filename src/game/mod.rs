//! Row and turn orchestration around the field engine.
//!
//! The game owns everything the engine does not: score, lives, the turn
//! timer, player positions, the per-row environment, and the optional remote
//! lookup. It changes the field only through the engine's operators.

mod config;
mod session;
mod state;

pub use config::{ConfigError, GameConfig, RemoteConfig, BUILTIN_GAME_CONFIG, CONFIG_PATH_ENV};
pub use session::{RemoteStatus, Session, TurnOutcome};
pub use state::{GameState, GameStatus};

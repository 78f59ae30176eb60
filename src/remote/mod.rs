// src/remote/mod.rs

//! The optional remote probability service.
//!
//! A service answers a [`WalkRequest`] with a probability vector of the
//! field's width, or with an error sentinel. Lookups run as cancellable
//! tasks ([`spawn_lookup`]) so the game never blocks on them: until a lookup
//! resolves, the engine's local vector stays authoritative, and any failure
//! simply leaves it in place.

mod lookup;

pub use lookup::{spawn_lookup, PendingLookup};

use crate::core::field_constants::DEFAULT_WIDTH;
use crate::walk::{simulate_walk, CoinType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkRequest {
    /// Number of columns; the reply must have exactly this many entries.
    pub width: usize,
    /// Walk steps to simulate.
    pub steps: u32,
    /// Coin used by the walk.
    pub coin_type: CoinType,
    /// Column the walker starts on.
    pub start_column: usize,
    /// Angles for the biased and custom coins.
    #[serde(default)]
    pub custom_coin_angles: Vec<f64>,
}

impl WalkRequest {
    /// Hadamard walk of `width` steps starting at `start_column`.
    pub fn new(width: usize, start_column: usize) -> Self {
        Self {
            width,
            steps: width as u32,
            coin_type: CoinType::Hadamard,
            start_column,
            custom_coin_angles: Vec::new(),
        }
    }

    /// Sets the step count.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the coin and its angles.
    pub fn with_coin(mut self, coin: CoinType, angles: Vec<f64>) -> Self {
        self.coin_type = coin;
        self.custom_coin_angles = angles;
        self
    }

    /// JSON body for the wire.
    pub fn to_json(&self) -> Result<String, RemoteError> {
        serde_json::to_string(self).map_err(|err| RemoteError::Malformed { message: err.to_string() })
    }
}

impl Default for WalkRequest {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, 0)
    }
}

/// Reply from the service: a vector, or the error sentinel `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WalkReply {
    /// Successful computation.
    Probabilities {
        /// One entry per column.
        probabilities: Vec<f64>,
    },
    /// The service (or its transport) failed.
    Error {
        /// Failure tag, e.g. `"network"`.
        error: String,
    },
}

impl WalkReply {
    /// Parses a reply body. Anything that is neither shape is `Malformed`.
    pub fn from_json(body: &str) -> Result<Self, RemoteError> {
        serde_json::from_str(body).map_err(|err| RemoteError::Malformed { message: err.to_string() })
    }

    /// The vector, or the sentinel turned into `RemoteError::Service`.
    pub fn into_probabilities(self) -> Result<Vec<f64>, RemoteError> {
        match self {
            WalkReply::Probabilities { probabilities } => Ok(probabilities),
            WalkReply::Error { error } => Err(RemoteError::Service { message: error }),
        }
    }
}

/// Why a remote lookup produced no usable vector. Never fatal to the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No reply before the deadline.
    #[error("remote lookup timed out after {after_ms} ms")]
    Timeout {
        /// The deadline that elapsed.
        after_ms: u64,
    },
    /// The lookup was cancelled (row transition, or the handle was dropped).
    #[error("remote lookup cancelled")]
    Cancelled,
    /// The service reported a failure.
    #[error("remote service failed: {message}")]
    Service {
        /// Sentinel or transport message.
        message: String,
    },
    /// The reply could not stand in for the local vector.
    #[error("remote reply malformed: {message}")]
    Malformed {
        /// What was wrong with it.
        message: String,
    },
}

/// Anything that can answer a walk request. Implementations may block;
/// lookups run them on Tokio's blocking pool.
///
/// A timed-out or cancelled lookup stops waiting, but the blocking call
/// itself runs until it returns and holds a blocking-pool thread meanwhile.
/// Implementations doing I/O should bound it with their own timeout.
pub trait ProbabilityService: Send + Sync {
    /// Computes (or fetches) the probability vector for `request`.
    fn fetch(&self, request: &WalkRequest) -> Result<WalkReply, RemoteError>;
}

impl<F> ProbabilityService for F
where
    F: Fn(&WalkRequest) -> Result<WalkReply, RemoteError> + Send + Sync,
{
    fn fetch(&self, request: &WalkRequest) -> Result<WalkReply, RemoteError> {
        self(request)
    }
}

/// In-process service running the coined walk directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWalkService;

impl ProbabilityService for LocalWalkService {
    fn fetch(&self, request: &WalkRequest) -> Result<WalkReply, RemoteError> {
        let probabilities = simulate_walk(
            request.width,
            request.steps,
            request.coin_type,
            &request.custom_coin_angles,
            request.start_column,
        )
        .map_err(|err| RemoteError::Service { message: err.to_string() })?;
        Ok(WalkReply::Probabilities { probabilities })
    }
}

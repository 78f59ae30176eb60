// src/remote/lookup.rs

use super::{ProbabilityService, RemoteError, WalkRequest};
use crate::validation::validate_distribution;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};

type LookupResult = Result<Vec<f64>, RemoteError>;

/// Handle to an in-flight remote lookup.
///
/// The result arrives on a one-shot channel. Cancelling, or dropping the
/// handle, signals the task to give up; a late reply is then discarded.
#[derive(Debug)]
pub struct PendingLookup {
    request: WalkRequest,
    result_rx: oneshot::Receiver<LookupResult>,
    cancel_tx: Option<oneshot::Sender<()>>,
    finished: bool,
}

impl PendingLookup {
    /// The request this lookup is answering.
    pub fn request(&self) -> &WalkRequest {
        &self.request
    }

    /// Asks the task to stop. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
            debug!(target: "qfield::remote", start = self.request.start_column, "remote.lookup.cancel");
        }
    }

    /// Non-blocking check. `None` while the lookup is still running; the
    /// outcome is handed out once, after which this returns `None`.
    pub fn try_take(&mut self) -> Option<LookupResult> {
        if self.finished {
            return None;
        }
        match self.result_rx.try_recv() {
            Ok(outcome) => {
                self.finished = true;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.finished = true;
                Some(Err(RemoteError::Cancelled))
            }
        }
    }

    /// Waits for the outcome.
    pub async fn resolve(self) -> LookupResult {
        let PendingLookup { result_rx, cancel_tx, finished, .. } = self;
        if finished {
            return Err(RemoteError::Cancelled);
        }
        // Keeps the cancel channel open while waiting; dropping it would cancel.
        let _cancel_guard = cancel_tx;
        result_rx.await.unwrap_or(Err(RemoteError::Cancelled))
    }
}

/// Starts a lookup on the current Tokio runtime.
///
/// The service runs on the blocking pool under `timeout`, raced against the
/// cancellation signal. A reply is only delivered if it passes
/// [`validate_distribution`] for the requested width.
///
/// # Panics
/// When called outside a Tokio runtime.
pub fn spawn_lookup(service: Arc<dyn ProbabilityService>, request: WalkRequest, timeout: Duration) -> PendingLookup {
    let (result_tx, result_rx) = oneshot::channel();
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let job = request.clone();

    tokio::spawn(async move {
        let width = job.width;
        let start = job.start_column;
        let fetch = tokio::task::spawn_blocking(move || service.fetch(&job));
        let outcome = tokio::select! {
            _ = cancel_rx => Err(RemoteError::Cancelled),
            joined = tokio::time::timeout(timeout, fetch) => match joined {
                Err(_) => Err(RemoteError::Timeout { after_ms: timeout.as_millis() as u64 }),
                Ok(Err(join_err)) => Err(RemoteError::Service { message: join_err.to_string() }),
                Ok(Ok(reply)) => reply.and_then(|r| r.into_probabilities()).and_then(|probabilities| {
                    validate_distribution(&probabilities, width)
                        .map(|()| probabilities)
                        .map_err(|err| RemoteError::Malformed { message: err.to_string() })
                }),
            },
        };
        match &outcome {
            Ok(_) => debug!(target: "qfield::remote", start, "remote.lookup.resolved"),
            Err(RemoteError::Cancelled) => debug!(target: "qfield::remote", start, "remote.lookup.cancelled"),
            Err(err) => warn!(target: "qfield::remote", start, error = %err, "remote.lookup.failed"),
        }
        // The receiver may be gone already; the result is simply dropped then.
        let _ = result_tx.send(outcome);
    });

    PendingLookup {
        request,
        result_rx,
        cancel_tx: Some(cancel_tx),
        finished: false,
    }
}

//! Fire-and-forget result recording.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::db::{DbError, GameRepository, MatchResult};

/// Stores finished matches. Implementations block; call them through
/// [`record_in_background`].
pub trait ResultRecorder: Send + Sync {
    /// Records one match.
    fn record(&self, result: &MatchResult) -> Result<(), DbError>;
}

impl ResultRecorder for GameRepository {
    fn record(&self, result: &MatchResult) -> Result<(), DbError> {
        self.record_result(result).map(|_| ())
    }
}

/// Discards results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl ResultRecorder for NullRecorder {
    fn record(&self, _result: &MatchResult) -> Result<(), DbError> {
        Ok(())
    }
}

/// Records `result` on the blocking pool. Failures are logged and never
/// reach the caller; the handle only tells when the attempt finished.
#[instrument(skip(recorder, result), fields(mode = %result.mode()))]
pub fn record_in_background(recorder: Arc<dyn ResultRecorder>, result: MatchResult) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || match recorder.record(&result) {
        Ok(()) => debug!("Result recorded"),
        Err(e) => error!(error = %e, "Failed to record result"),
    })
}

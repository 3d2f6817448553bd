//! Transcript persistence boundary.

use crate::transcript::GameRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a transcript sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable recording of a finished game.
///
/// The core hands a finalized [`GameRecord`] to the sink exactly once,
/// after the state machine reaches `Done`. Aborted runs never reach a
/// sink.
pub trait TranscriptSink {
    /// Persist the record, returning where it landed.
    fn persist(&self, record: &GameRecord) -> Result<PathBuf, SinkError>;
}

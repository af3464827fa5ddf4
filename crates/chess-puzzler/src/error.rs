//! Puzzler error types

use chess_core::CorpusError;
use thiserror::Error;

/// Failure while asking the evaluation oracle for a score.
///
/// Any of these aborts classification of the position: a move is never
/// labelled from a missing or partial evaluation.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine exited while waiting for '{waiting_for}'")]
    EngineExited { waiting_for: String },

    #[error("Engine returned no score for {fen}")]
    MissingScore { fen: String },

    #[error("Engine protocol error: {0}")]
    Protocol(String),
}

#[derive(Error, Debug)]
pub enum MineError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

//! Worker error types

use std::path::PathBuf;

use chess_core::CorpusError;
use chess_puzzler::{MineError, OracleError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<MineError> for WorkerError {
    fn from(err: MineError) -> Self {
        match err {
            MineError::Corpus(e) => WorkerError::Corpus(e),
            MineError::Oracle(e) => WorkerError::Oracle(e),
        }
    }
}

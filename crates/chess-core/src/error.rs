use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("PGN corpus not found: {0}")]
    NotFound(PathBuf),

    #[error("No .pgn files in directory: {0}")]
    NoPgnFiles(PathBuf),

    #[error("Invalid corpus pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to list corpus files: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A FEN that does not describe a playable position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal position {fen:?}: {reason}")]
    Illegal { fen: String, reason: String },
}

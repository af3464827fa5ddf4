//! Shared chess plumbing: PGN corpus scanning and position helpers.

pub mod corpus;
pub mod error;
pub mod position;

pub use corpus::{Corpus, CorpusEntry, MalformedGame, ScanOptions, ScannedGame, ScannedPosition};
pub use error::{CorpusError, SetupError};

//! Puzzle mining worker: configuration, the Stockfish oracle, the run itself
//! and the JSON report.

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod stockfish;

pub use config::{ClassifierKind, EngineOptions, WorkerConfig};
pub use error::WorkerError;

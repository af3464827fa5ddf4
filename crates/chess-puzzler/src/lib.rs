//! Tactical puzzle mining.
//!
//! Positions from a game corpus are searched for checks and captures, the
//! candidates are classified (by an engine or by simple density), both sides
//! of the board are aggregated and the survivors become difficulty-tiered
//! puzzle records.

pub mod classify;
pub mod error;
pub mod pipeline;
pub mod puzzle;
pub mod score;
pub mod tactics;

pub use error::{MineError, OracleError};
pub use score::Score;

//! The seam between the mining shell and the two classification policies.
//!
//! `EngineClassifier` asks an evaluation oracle which checks and captures are
//! sound. `DensityClassifier` only counts them. Both produce a report that the
//! mirror aggregator can concatenate and the selector can judge.

pub mod engine;

use shakmaty::Chess;

use crate::error::OracleError;
use crate::puzzle::Targets;

pub use engine::{ClassificationPolicy, EngineClassifier, Label, MoveSplit, Oracle, SearchDepths};

/// What one classifier found for one side of one board.
pub trait TacticReport: Default {
    /// Concatenate another contribution after this one.
    fn append(&mut self, other: Self);

    fn total_targets(&self) -> usize;

    /// False when nothing in the report can be played as a solution.
    fn has_solution(&self) -> bool;

    /// Sides skipped without evaluation because they were already lost.
    fn hopeless_sides(&self) -> usize {
        0
    }

    fn into_targets(self) -> Targets;
}

/// Classifies the tactics available to the side to move.
pub trait Classifier {
    type Report: TacticReport;

    fn classify(&mut self, position: &Chess) -> Result<Self::Report, OracleError>;
}

impl<C: Classifier + ?Sized> Classifier for &mut C {
    type Report = C::Report;

    fn classify(&mut self, position: &Chess) -> Result<Self::Report, OracleError> {
        (**self).classify(position)
    }
}

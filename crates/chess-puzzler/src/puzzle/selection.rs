/// Puzzle selection: thresholds, deduplication and the append-only collection

use std::collections::HashSet;

use chess_core::position::{fingerprint, full_fen};
use shakmaty::Chess;

use super::{Difficulty, PuzzleRecord, TierCounts};
use crate::classify::TacticReport;

const DEFAULT_MIN_TOTAL_TARGETS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRules {
    pub min_total_targets: usize,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            min_total_targets: DEFAULT_MIN_TOTAL_TARGETS,
        }
    }
}

/// Why a position was not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Every target was labelled bad: nothing to solve.
    NoGoodMove,
    TooFewTargets { total: usize },
    Duplicate,
}

/// Accepted puzzles in acceptance order. Records are only ever appended.
#[derive(Debug, Default)]
pub struct PuzzleCollection {
    records: Vec<PuzzleRecord>,
    fingerprints: HashSet<String>,
    tiers: TierCounts,
}

impl PuzzleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or reject a position given everything classified for it.
    pub fn offer<R: TacticReport>(
        &mut self,
        rules: &SelectionRules,
        position: &Chess,
        report: R,
    ) -> Result<Difficulty, Rejection> {
        if !report.has_solution() {
            return Err(Rejection::NoGoodMove);
        }

        let total = report.total_targets();
        if total < rules.min_total_targets {
            return Err(Rejection::TooFewTargets { total });
        }

        if !self.fingerprints.insert(fingerprint(position)) {
            return Err(Rejection::Duplicate);
        }

        let difficulty = Difficulty::from_targets(total);
        self.tiers.record(difficulty);
        self.records.push(PuzzleRecord {
            fen: full_fen(position),
            difficulty,
            targets: report.into_targets(),
        });
        Ok(difficulty)
    }

    #[cfg(test)]
    fn contains(&self, position: &Chess) -> bool {
        self.fingerprints.contains(&fingerprint(position))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PuzzleRecord] {
        &self.records
    }

    pub fn tiers(&self) -> TierCounts {
        self.tiers
    }

    pub fn into_records(self) -> Vec<PuzzleRecord> {
        self.records
    }
}

/// Puzzle data model: records, difficulty tiers and what each record carries

pub mod mirror;
pub mod selection;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tactics::density::SideDensity;

/// Difficulty is a step function of the number of targets in the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const EASY_MAX: usize = 8;
    pub const MEDIUM_MAX: usize = 14;

    pub fn from_targets(total_targets: usize) -> Self {
        if total_targets <= Self::EASY_MAX {
            Difficulty::Easy
        } else if total_targets <= Self::MEDIUM_MAX {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The targets stored with a puzzle, depending on which classifier ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    Classified {
        good_moves: Vec<String>,
        bad_moves: Vec<String>,
    },
    Density {
        summary: String,
        white: SideDensity,
        black: SideDensity,
    },
}

impl Targets {
    pub fn total(&self) -> usize {
        match self {
            Targets::Classified {
                good_moves,
                bad_moves,
            } => good_moves.len() + bad_moves.len(),
            Targets::Density { white, black, .. } => white.total() + black.total(),
        }
    }
}

/// One accepted puzzle. Never modified after it enters the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub fen: String,
    pub difficulty: Difficulty,
    #[serde(flatten)]
    pub targets: Targets,
}

/// Accepted puzzles per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl TierCounts {
    pub fn record(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Medium => self.medium += 1,
            Difficulty::Hard => self.hard += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

//! The mining loop.
//!
//! One position at a time: classify both sides through the mirror aggregator,
//! hand the result to the selector, stop as soon as enough puzzles have been
//! accepted. The stop condition is checked between positions, so a game can
//! be left half way through.

use std::time::{Duration, Instant};

use chess_core::{CorpusEntry, CorpusError, ScannedGame};
use shakmaty::Chess;
use tracing::{debug, info};

use crate::classify::{Classifier, TacticReport};
use crate::error::{MineError, OracleError};
use crate::puzzle::mirror::aggregate;
use crate::puzzle::selection::{PuzzleCollection, Rejection, SelectionRules};
use crate::puzzle::Difficulty;

const DEFAULT_MAX_PUZZLES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinerOptions {
    /// Stop once this many puzzles are accepted.
    pub max_puzzles: usize,
    pub selection: SelectionRules,
}

impl Default for MinerOptions {
    fn default() -> Self {
        Self {
            max_puzzles: DEFAULT_MAX_PUZZLES,
            selection: SelectionRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiningStats {
    pub games: usize,
    pub malformed_games: usize,
    pub positions: usize,
    pub no_good_move: usize,
    pub too_few_targets: usize,
    pub duplicates: usize,
    /// Sides not evaluated because the baseline was already lost
    pub hopeless_sides: usize,
    pub elapsed: Duration,
}

pub struct Miner<C> {
    classifier: C,
    options: MinerOptions,
    collection: PuzzleCollection,
    stats: MiningStats,
    total_games: Option<usize>,
    current_game: usize,
    started: Instant,
}

impl<C: Classifier> Miner<C> {
    pub fn new(classifier: C, options: MinerOptions) -> Self {
        Self {
            classifier,
            options,
            collection: PuzzleCollection::new(),
            stats: MiningStats::default(),
            total_games: None,
            current_game: 0,
            started: Instant::now(),
        }
    }

    /// Game count of the corpus, for progress output only.
    pub fn with_total_games(mut self, total_games: usize) -> Self {
        self.total_games = Some(total_games);
        self
    }

    pub fn is_done(&self) -> bool {
        self.collection.len() >= self.options.max_puzzles
    }

    pub fn collection(&self) -> &PuzzleCollection {
        &self.collection
    }

    pub fn stats(&self) -> &MiningStats {
        &self.stats
    }

    /// Classify, aggregate and select a single position.
    pub fn mine_position(&mut self, position: &Chess) -> Result<Option<Difficulty>, OracleError> {
        self.stats.positions += 1;

        let report = aggregate(&mut self.classifier, position)?;
        self.stats.hopeless_sides += report.hopeless_sides();
        let total = report.total_targets();

        match self.collection.offer(&self.options.selection, position, report) {
            Ok(difficulty) => {
                self.log_accepted(difficulty, total);
                Ok(Some(difficulty))
            }
            Err(rejection) => {
                match rejection {
                    Rejection::NoGoodMove => self.stats.no_good_move += 1,
                    Rejection::TooFewTargets { .. } => self.stats.too_few_targets += 1,
                    Rejection::Duplicate => self.stats.duplicates += 1,
                }
                Ok(None)
            }
        }
    }

    pub fn mine_game(&mut self, game: &ScannedGame) -> Result<(), OracleError> {
        self.stats.games += 1;
        self.current_game = game.number;
        debug!(
            game = game.number,
            of = ?self.total_games,
            white = %game.white,
            black = %game.black,
            positions = game.positions.len(),
            "Scanning game"
        );

        for scanned in &game.positions {
            if self.is_done() {
                break;
            }
            if let Some(difficulty) = self.mine_position(&scanned.position)? {
                debug!(game = game.number, ply = scanned.ply, %difficulty, "Position kept");
            }
        }
        Ok(())
    }

    /// Mine games until the corpus runs out or enough puzzles are collected.
    pub fn run<I>(&mut self, corpus: I) -> Result<(), MineError>
    where
        I: IntoIterator<Item = Result<CorpusEntry, CorpusError>>,
    {
        for entry in corpus {
            if self.is_done() {
                break;
            }
            match entry? {
                CorpusEntry::Game(game) => self.mine_game(&game)?,
                CorpusEntry::Malformed(_) => self.stats.malformed_games += 1,
            }
        }
        self.stats.elapsed = self.started.elapsed();
        Ok(())
    }

    pub fn finish(mut self) -> (PuzzleCollection, MiningStats, C) {
        self.stats.elapsed = self.started.elapsed();
        (self.collection, self.stats, self.classifier)
    }

    fn log_accepted(&self, difficulty: Difficulty, targets: usize) {
        let accepted = self.collection.len();
        let remaining = self.options.max_puzzles.saturating_sub(accepted);
        let eta = self
            .started
            .elapsed()
            .div_f64(accepted as f64)
            .mul_f64(remaining as f64);
        info!(
            game = self.current_game,
            accepted,
            target = self.options.max_puzzles,
            targets,
            %difficulty,
            eta = %format_duration(eta),
            "Puzzle accepted"
        );
    }
}

/// `H:MM:SS`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

//! Output: the puzzle file and the end-of-run summary

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chess_puzzler::pipeline::{format_duration, MiningStats};
use chess_puzzler::puzzle::{PuzzleRecord, TierCounts};
use serde::Serialize;

use crate::config::ClassifierKind;
use crate::error::WorkerError;

/// Serialize records as a JSON array with 4-space indentation.
pub fn to_json(records: &[PuzzleRecord]) -> Result<Vec<u8>, WorkerError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

pub fn write_puzzles(path: &Path, records: &[PuzzleRecord]) -> Result<(), WorkerError> {
    let json = to_json(records)?;
    fs::write(path, json).map_err(|source| WorkerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// What a finished run reports on the console.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub classifier: ClassifierKind,
    pub output_path: PathBuf,
    pub tiers: TierCounts,
    pub stats: MiningStats,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(f, "Mining complete ({} classifier)", self.classifier)?;
        writeln!(
            f,
            "  Saved {} puzzles to {}",
            self.tiers.total(),
            self.output_path.display()
        )?;
        writeln!(f, "  Easy (<=8 targets):   {}", self.tiers.easy)?;
        writeln!(f, "  Medium (<=14 targets): {}", self.tiers.medium)?;
        writeln!(f, "  Hard (>14 targets):   {}", self.tiers.hard)?;
        writeln!(
            f,
            "  Games: {} scanned, {} malformed",
            stats.games, stats.malformed_games
        )?;
        writeln!(
            f,
            "  Positions: {} examined, {} without a good move, {} with too few targets, {} duplicates",
            stats.positions, stats.no_good_move, stats.too_few_targets, stats.duplicates
        )?;
        if stats.hopeless_sides > 0 {
            writeln!(f, "  Sides skipped as already lost: {}", stats.hopeless_sides)?;
        }
        write!(f, "  Total time: {}", format_duration(stats.elapsed))
    }
}

/// Tactical density: how many checks and captures a side has, without asking
/// an engine which of them are any good

use chess_core::position::force_turn;
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position};

use crate::classify::{Classifier, TacticReport};
use crate::error::OracleError;
use crate::puzzle::Targets;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDensity {
    pub checks: usize,
    pub captures: usize,
}

impl SideDensity {
    pub fn total(&self) -> usize {
        self.checks + self.captures
    }
}

/// Count checks and captures for `side` on this board.
///
/// The board is first given to `side` to move. Returns `None` when that is
/// not a legal position (the other side would be in check).
pub fn density_for_side(position: &Chess, side: Color) -> Option<SideDensity> {
    let forced = force_turn(position, side)?;
    Some(count_density(&forced))
}

/// Checks and captures over every legal move of the side to move. A capture
/// that gives check counts once in each column.
fn count_density(position: &Chess) -> SideDensity {
    let mut density = SideDensity::default();
    for mv in position.legal_moves() {
        if mv.is_capture() {
            density.captures += 1;
        }
        let mut after = position.clone();
        after.play_unchecked(mv);
        if after.is_check() {
            density.checks += 1;
        }
    }
    density
}

/// Per-colour density for one board snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DensityReport {
    pub white: SideDensity,
    pub black: SideDensity,
}

impl DensityReport {
    fn side_mut(&mut self, color: Color) -> &mut SideDensity {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "White: {} checks, {} captures | Black: {} checks, {} captures",
            self.white.checks, self.white.captures, self.black.checks, self.black.captures
        )
    }
}

impl TacticReport for DensityReport {
    fn append(&mut self, other: Self) {
        self.white.checks += other.white.checks;
        self.white.captures += other.white.captures;
        self.black.checks += other.black.checks;
        self.black.captures += other.black.captures;
    }

    fn total_targets(&self) -> usize {
        self.white.total() + self.black.total()
    }

    fn has_solution(&self) -> bool {
        true
    }

    fn into_targets(self) -> Targets {
        Targets::Density {
            summary: self.summary(),
            white: self.white,
            black: self.black,
        }
    }
}

/// Classifier used when no engine is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityClassifier;

impl Classifier for DensityClassifier {
    type Report = DensityReport;

    fn classify(&mut self, position: &Chess) -> Result<DensityReport, OracleError> {
        let side = position.turn();
        let mut report = DensityReport::default();
        if let Some(density) = density_for_side(position, side) {
            *report.side_mut(side) = density;
        }
        Ok(report)
    }
}

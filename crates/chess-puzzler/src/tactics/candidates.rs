/// Tactical candidate extraction: the checks and captures available to the
/// side to move

use shakmaty::{san::San, Chess, Position};

/// A legal check or capture, with the position it leads to.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// SAN with `+` / `#` suffix
    pub san: String,
    pub is_capture: bool,
    pub gives_check: bool,
    pub after: Chess,
}

/// Legal moves for the side to move that capture or give check, in move
/// generation order. The input position is never modified.
pub fn tactical_candidates(position: &Chess) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for mv in position.legal_moves() {
        let is_capture = mv.is_capture();

        let mut after = position.clone();
        after.play_unchecked(mv.clone());
        let gives_check = after.is_check();

        if !is_capture && !gives_check {
            continue;
        }

        let suffix = if after.is_checkmate() {
            "#"
        } else if gives_check {
            "+"
        } else {
            ""
        };
        let san = format!("{}{}", San::from_move(position, mv.clone()), suffix);

        candidates.push(Candidate {
            san,
            is_capture,
            gives_check,
            after,
        });
    }

    candidates
}

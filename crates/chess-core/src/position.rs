//! Position helpers: FEN fingerprints and side-to-move manipulation.

use shakmaty::{fen::Fen, CastlingMode, Chess, Color, EnPassantMode, Position};

use crate::error::SetupError;

/// Full FEN including move counters. En passant is only written when a
/// capture is actually possible.
pub fn full_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// FEN without the half-move clock and full-move number.
///
/// Two positions with the same fingerprint are the same puzzle, however they
/// were reached.
pub fn fingerprint(position: &Chess) -> String {
    normalize_fen(&full_fen(position))
}

/// Strip move counters from a FEN string (position + side + castling + ep).
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Number of pieces on the board, kings included.
pub fn piece_count(position: &Chess) -> usize {
    position.board().occupied().count()
}

/// Parse and validate a FEN.
pub fn parse_position(fen: &str) -> Result<Chess, SetupError> {
    let parsed = fen.parse::<Fen>().map_err(|e| SetupError::InvalidFen {
        fen: fen.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| SetupError::Illegal {
            fen: fen.to_string(),
            reason: e.to_string(),
        })
}

/// Flip side-to-move and clear en passant, keeping everything else.
pub fn flip_turn_fen(fen: &str) -> String {
    let parts: Vec<&str> = fen.split(' ').collect();
    if parts.len() < 4 {
        return fen.to_string();
    }
    let side = if parts[1] == "w" { "b" } else { "w" };
    format!(
        "{} {} {} - {} {}",
        parts[0],
        side,
        parts[2],
        parts.get(4).unwrap_or(&"0"),
        parts.get(5).unwrap_or(&"1"),
    )
}

/// The same board with the other side to move.
///
/// Returns `None` when that position could never arise in a game, most
/// commonly because the side that would now be waiting is in check.
pub fn flip_turn(position: &Chess) -> Option<Chess> {
    parse_position(&flip_turn_fen(&full_fen(position))).ok()
}

/// The same board with `side` to move; identity when it already is.
pub fn force_turn(position: &Chess, side: Color) -> Option<Chess> {
    if position.turn() == side {
        Some(position.clone())
    } else {
        flip_turn(position)
    }
}

/// Mirror aggregation: tactics for both sides of one board snapshot

use chess_core::position::flip_turn;
use shakmaty::Chess;
use tracing::trace;

use crate::classify::{Classifier, TacticReport};
use crate::error::OracleError;

/// Classify the position as it stands, then the same board with the other
/// side to move and no en-passant right.
///
/// The flipped board contributes nothing when it is not a legal position.
/// Contributions are concatenated original first.
pub fn aggregate<C: Classifier>(
    classifier: &mut C,
    position: &Chess,
) -> Result<C::Report, OracleError> {
    let mut report = classifier.classify(position)?;

    match flip_turn(position) {
        Some(flipped) => report.append(classifier.classify(&flipped)?),
        None => trace!("Flipped position is illegal, no mirror contribution"),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassificationPolicy, EngineClassifier, Oracle, SearchDepths};
    use crate::score::Score;
    use crate::tactics::density::{DensityClassifier, SideDensity};
    use chess_core::position::{fingerprint, parse_position};
    use shakmaty::Position;

    /// Counts calls, records the side to move of each baseline query.
    #[derive(Default)]
    struct FlatOracle {
        turns: Vec<shakmaty::Color>,
    }

    impl Oracle for FlatOracle {
        fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<Score, OracleError> {
            if depth == SearchDepths::default().base() {
                self.turns.push(position.turn());
            }
            Ok(Score::cp(0))
        }
    }

    #[test]
    fn test_both_sides_contribute_original_first() {
        // 1. e4 d5: exd5 and Bb5+ for White, dxe4 for Black.
        let pos = parse_position("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
            .unwrap();
        let mut oracle = FlatOracle::default();
        let mut classifier = EngineClassifier::new(
            &mut oracle,
            ClassificationPolicy::default(),
            SearchDepths::default(),
        );
        let split = aggregate(&mut classifier, &pos).unwrap();
        assert_eq!(split.good, vec!["exd5", "Bb5+", "dxe4"]);
        assert!(split.bad.is_empty());
        assert_eq!(
            oracle.turns,
            vec![shakmaty::Color::White, shakmaty::Color::Black]
        );
    }

    #[test]
    fn test_illegal_flip_contributes_nothing() {
        // Black is in check; White cannot be handed the move.
        let pos = parse_position("rnbqkbnr/ppp2ppp/8/1B1pp3/4P3/8/PPPP1PPP/RNBQK1NR b KQkq - 1 3")
            .unwrap();
        let report = aggregate(&mut DensityClassifier, &pos).unwrap();
        assert_eq!(report.white, SideDensity::default());

        let alone = DensityClassifier.classify(&pos).unwrap();
        assert_eq!(report, alone);
    }

    #[test]
    fn test_density_mirror_fills_both_colours() {
        let pos = parse_position("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
            .unwrap();
        let before = fingerprint(&pos);
        let report = aggregate(&mut DensityClassifier, &pos).unwrap();
        assert_eq!(report.white.captures, 1);
        assert_eq!(report.black.captures, 1);
        assert_eq!(fingerprint(&pos), before);
    }
}

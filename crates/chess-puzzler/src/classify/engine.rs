/// Engine-backed move classification: score every check and capture against
/// a baseline and label it good or bad

use shakmaty::Chess;
use tracing::debug;

use super::{Classifier, TacticReport};
use crate::error::OracleError;
use crate::puzzle::Targets;
use crate::score::Score;
use crate::tactics::candidates::tactical_candidates;

const DEFAULT_BLUNDER_THRESHOLD: i32 = 100;
const DEFAULT_WINNING_SCORE: i32 = 150;
const DEFAULT_LOSING_SCORE: i32 = -150;
const DEFAULT_BALANCED_FLOOR: i32 = -50;
const DEFAULT_HOPELESS_SCORE: i32 = -300;

/// Anything that can score a position for the side to move at a given depth.
pub trait Oracle {
    fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<Score, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<Score, OracleError> {
        (**self).evaluate(position, depth)
    }
}

/// Shallow baseline search, deeper search once a candidate is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDepths {
    base: u32,
    eval: u32,
}

impl SearchDepths {
    /// `None` unless `eval > base`.
    pub fn new(base: u32, eval: u32) -> Option<Self> {
        (eval > base).then_some(Self { base, eval })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn eval(&self) -> u32 {
        self.eval
    }
}

impl Default for SearchDepths {
    fn default() -> Self {
        Self { base: 10, eval: 25 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Good,
    Bad,
}

/// Thresholds in centipawns, all from the mover's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationPolicy {
    /// A drop from the baseline larger than this is a blunder.
    pub blunder_threshold: i32,
    /// At or above this the mover is winning.
    pub winning_score: i32,
    /// Below this the mover is clearly lost.
    pub losing_score: i32,
    /// Above this the baseline counts as roughly balanced.
    pub balanced_floor: i32,
    /// Baselines below this are not worth evaluating. `None` evaluates all.
    pub hopeless_score: Option<i32>,
    /// Enables the win-threshold and loss-threshold rules.
    pub strict_win_check: bool,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            blunder_threshold: DEFAULT_BLUNDER_THRESHOLD,
            winning_score: DEFAULT_WINNING_SCORE,
            losing_score: DEFAULT_LOSING_SCORE,
            balanced_floor: DEFAULT_BALANCED_FLOOR,
            hopeless_score: Some(DEFAULT_HOPELESS_SCORE),
            strict_win_check: true,
        }
    }
}

impl ClassificationPolicy {
    pub fn is_hopeless(&self, base: Score) -> bool {
        self.hopeless_score.is_some_and(|floor| base.centipawns() < floor)
    }

    /// Label a move that turned `base` into `after` (both for the mover).
    pub fn label(&self, base: Score, after: Score) -> Label {
        let base_cp = base.centipawns();
        let after_cp = after.centipawns();

        if base_cp - after_cp > self.blunder_threshold {
            return Label::Bad;
        }

        if self.strict_win_check {
            // Threw away a win. Converting into a forced mate is exempt.
            if base_cp >= self.winning_score
                && after_cp < self.winning_score
                && !after.is_mate_for_mover()
            {
                return Label::Bad;
            }
            // Went from about equal to clearly lost.
            if base_cp > self.balanced_floor && after_cp < self.losing_score {
                return Label::Bad;
            }
        }

        Label::Good
    }
}

/// Good and bad move notations for one side, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSplit {
    pub good: Vec<String>,
    pub bad: Vec<String>,
    pub(crate) hopeless: usize,
}

impl MoveSplit {
    fn hopeless() -> Self {
        Self {
            hopeless: 1,
            ..Self::default()
        }
    }
}

impl TacticReport for MoveSplit {
    fn append(&mut self, other: Self) {
        self.good.extend(other.good);
        self.bad.extend(other.bad);
        self.hopeless += other.hopeless;
    }

    fn total_targets(&self) -> usize {
        self.good.len() + self.bad.len()
    }

    fn has_solution(&self) -> bool {
        !self.good.is_empty()
    }

    fn hopeless_sides(&self) -> usize {
        self.hopeless
    }

    fn into_targets(self) -> Targets {
        Targets::Classified {
            good_moves: self.good,
            bad_moves: self.bad,
        }
    }
}

/// Labels each check and capture by what the oracle thinks of the result.
pub struct EngineClassifier<O> {
    oracle: O,
    policy: ClassificationPolicy,
    depths: SearchDepths,
}

impl<O: Oracle> EngineClassifier<O> {
    pub fn new(oracle: O, policy: ClassificationPolicy, depths: SearchDepths) -> Self {
        Self {
            oracle,
            policy,
            depths,
        }
    }

    /// Hand the oracle back, e.g. to shut the engine down.
    pub fn into_oracle(self) -> O {
        self.oracle
    }
}

impl<O: Oracle> Classifier for EngineClassifier<O> {
    type Report = MoveSplit;

    fn classify(&mut self, position: &Chess) -> Result<MoveSplit, OracleError> {
        let candidates = tactical_candidates(position);
        if candidates.is_empty() {
            return Ok(MoveSplit::default());
        }

        let base = self.oracle.evaluate(position, self.depths.base())?;
        if self.policy.is_hopeless(base) {
            debug!(%base, candidates = candidates.len(), "Side already lost, skipping");
            return Ok(MoveSplit::hopeless());
        }

        let mut split = MoveSplit::default();
        for candidate in candidates {
            // The oracle scores for the opponent once the move is played.
            let after = -self.oracle.evaluate(&candidate.after, self.depths.eval())?;
            let label = self.policy.label(base, after);
            debug!(san = %candidate.san, %base, %after, ?label, "Candidate scored");
            match label {
                Label::Good => split.good.push(candidate.san),
                Label::Bad => split.bad.push(candidate.san),
            }
        }

        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::position::parse_position;

    /// Scholar's mate setup: White has Qxf7#, Bxf7+, Qxe5+ and Qxh7.
    const SCHOLAR: &str = "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 2 3";

    /// Returns `base` at the baseline depth and `after` (already from the
    /// mover's point of view) at the evaluation depth.
    struct ScriptedOracle {
        base: Score,
        after: Box<dyn FnMut(&Chess) -> Score>,
        calls: Vec<u32>,
        fail_on_call: Option<usize>,
    }

    impl ScriptedOracle {
        fn new(base: i32, after: impl FnMut(&Chess) -> Score + 'static) -> Self {
            Self {
                base: Score::cp(base),
                after: Box::new(after),
                calls: Vec::new(),
                fail_on_call: None,
            }
        }
    }

    impl Oracle for ScriptedOracle {
        fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<Score, OracleError> {
            self.calls.push(depth);
            if self.fail_on_call == Some(self.calls.len()) {
                return Err(OracleError::EngineExited {
                    waiting_for: "bestmove".into(),
                });
            }
            if depth == SearchDepths::default().base() {
                Ok(self.base)
            } else {
                Ok(-(self.after)(position))
            }
        }
    }

    fn classify(oracle: &mut ScriptedOracle, fen: &str) -> Result<MoveSplit, OracleError> {
        let position = parse_position(fen).unwrap();
        let mut classifier =
            EngineClassifier::new(oracle, ClassificationPolicy::default(), SearchDepths::default());
        classifier.classify(&position)
    }

    #[test]
    fn test_depths_must_deepen() {
        assert!(SearchDepths::new(10, 25).is_some());
        assert!(SearchDepths::new(10, 10).is_none());
        assert!(SearchDepths::new(20, 12).is_none());
    }

    #[test]
    fn test_no_candidates_means_no_oracle_calls() {
        let mut oracle = ScriptedOracle::new(0, |_| Score::cp(0));
        let split = classify(&mut oracle, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
            .unwrap();
        assert_eq!(split, MoveSplit::default());
        assert!(oracle.calls.is_empty());
    }

    #[test]
    fn test_baseline_then_each_candidate_at_eval_depth() {
        let mut oracle = ScriptedOracle::new(30, |_| Score::cp(20));
        let split = classify(&mut oracle, SCHOLAR).unwrap();
        let defaults = SearchDepths::default();
        assert_eq!(oracle.calls[0], defaults.base());
        assert!(oracle.calls[1..].iter().all(|&d| d == defaults.eval()));
        assert_eq!(oracle.calls.len(), 1 + split.total_targets());
        assert!(split.bad.is_empty());
    }

    #[test]
    fn test_small_drop_across_win_threshold_is_bad() {
        // Every move keeps the mover ahead by 140, only 60 below the
        // baseline, but gives up the win.
        let mut oracle = ScriptedOracle::new(200, |_| Score::cp(140));
        let split = classify(&mut oracle, SCHOLAR).unwrap();
        assert!(split.good.is_empty());
        assert!(split.bad.len() >= 3);

        let mut oracle = ScriptedOracle::new(155, |_| Score::cp(145));
        let split = classify(&mut oracle, SCHOLAR).unwrap();
        assert!(split.good.is_empty());
    }

    #[test]
    fn test_mate_is_exempt_from_win_threshold() {
        let mut oracle = ScriptedOracle::new(200, |after: &Chess| {
            if shakmaty::Position::is_checkmate(after) {
                Score::mate_in(1)
            } else {
                Score::cp(140)
            }
        });
        let split = classify(&mut oracle, SCHOLAR).unwrap();
        assert_eq!(split.good, vec!["Qxf7#"]);
        assert!(!split.bad.contains(&"Qxf7#".to_string()));
    }

    #[test]
    fn test_hopeless_side_is_skipped() {
        let mut oracle = ScriptedOracle::new(-400, |_| Score::cp(0));
        let split = classify(&mut oracle, SCHOLAR).unwrap();
        assert_eq!(split.total_targets(), 0);
        assert_eq!(split.hopeless_sides(), 1);
        assert_eq!(oracle.calls.len(), 1);
    }

    #[test]
    fn test_hopeless_check_can_be_disabled() {
        let position = parse_position(SCHOLAR).unwrap();
        let policy = ClassificationPolicy {
            hopeless_score: None,
            ..ClassificationPolicy::default()
        };
        let mut oracle = ScriptedOracle::new(-400, |_| Score::cp(-390));
        let mut classifier = EngineClassifier::new(&mut oracle, policy, SearchDepths::default());
        let split = classifier.classify(&position).unwrap();
        assert!(split.total_targets() >= 4);
        assert!(split.bad.is_empty());
    }

    #[test]
    fn test_oracle_failure_aborts_instead_of_labelling() {
        let mut oracle = ScriptedOracle::new(0, |_| Score::cp(0));
        oracle.fail_on_call = Some(2);
        assert!(classify(&mut oracle, SCHOLAR).is_err());
    }

    #[test]
    fn test_blunder_rule() {
        let policy = ClassificationPolicy::default();
        assert_eq!(policy.label(Score::cp(50), Score::cp(-51)), Label::Bad);
        assert_eq!(policy.label(Score::cp(50), Score::cp(-50)), Label::Good);
        assert_eq!(policy.label(Score::cp(1200), Score::cp(800)), Label::Bad);
    }

    #[test]
    fn test_loss_rule_is_independent_of_blunder_rule() {
        let policy = ClassificationPolicy {
            blunder_threshold: 1_000,
            ..ClassificationPolicy::default()
        };
        // A 180 drop is under this blunder threshold; only the loss rule fires.
        assert_eq!(policy.label(Score::cp(-20), Score::cp(-200)), Label::Bad);
        // Baseline not balanced: loss rule does not apply.
        assert_eq!(policy.label(Score::cp(-60), Score::cp(-200)), Label::Good);
        assert_eq!(policy.label(Score::cp(-20), Score::cp(-150)), Label::Good);
    }

    #[test]
    fn test_win_rule_boundaries() {
        let policy = ClassificationPolicy::default();
        assert_eq!(policy.label(Score::cp(150), Score::cp(149)), Label::Bad);
        assert_eq!(policy.label(Score::cp(150), Score::cp(150)), Label::Good);
        assert_eq!(policy.label(Score::cp(149), Score::cp(100)), Label::Good);
        assert_eq!(policy.label(Score::mate_in(2), Score::mate_in(1)), Label::Good);
    }

    #[test]
    fn test_relaxed_policy_only_uses_blunder_rule() {
        let policy = ClassificationPolicy {
            strict_win_check: false,
            ..ClassificationPolicy::default()
        };
        assert_eq!(policy.label(Score::cp(200), Score::cp(140)), Label::Good);
        assert_eq!(policy.label(Score::cp(-20), Score::cp(-110)), Label::Good);
        assert_eq!(policy.label(Score::cp(-20), Score::cp(-121)), Label::Bad);
    }
}

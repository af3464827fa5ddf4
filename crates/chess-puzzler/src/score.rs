/// Engine scores from the side-to-move's point of view

use std::fmt;
use std::ops::Neg;

/// Saturating value used for any forced mate.
pub const MATE_SCORE: i32 = 10_000;

/// Scores at or above this are treated as a forced mate for the mover.
pub const MATE_THRESHOLD: i32 = 9_000;

/// Centipawns from the perspective of the side to move, or ±`MATE_SCORE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

impl Score {
    pub fn cp(cp: i32) -> Self {
        Self(cp.clamp(-MATE_SCORE, MATE_SCORE))
    }

    /// `mate n`: positive n means the side to move mates. `mate 0` means the
    /// side to move is already mated.
    pub fn mate_in(moves: i32) -> Self {
        if moves > 0 {
            Self(MATE_SCORE)
        } else {
            Self(-MATE_SCORE)
        }
    }

    /// Build from the `score cp` / `score mate` fields of a UCI info line.
    /// Mate wins when both are present.
    pub fn from_uci(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(m)) => Some(Self::mate_in(m)),
            (Some(cp), None) => Some(Self::cp(cp)),
            (None, None) => None,
        }
    }

    pub fn centipawns(self) -> i32 {
        self.0
    }

    pub fn is_mate_for_mover(self) -> bool {
        self.0 >= MATE_THRESHOLD
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score(-self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= MATE_SCORE {
            write!(f, "#+")
        } else if self.0 <= -MATE_SCORE {
            write!(f, "#-")
        } else {
            write!(f, "{:+}", self.0)
        }
    }
}

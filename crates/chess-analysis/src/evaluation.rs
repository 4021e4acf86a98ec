//! Chess position evaluation types.

use chess_core::Color;
use serde::{Deserialize, Serialize};

/// Centipawn value standing in for a forced mate.
///
/// Mate in `n` maps to `MATE_SCORE - n`, so quicker mates score higher.
pub const MATE_SCORE: i32 = 100_000;

/// A raw engine score, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Score {
    /// Centipawn evaluation (positive = side to move is better)
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates, zero or negative = it is mated)
    Mate(i32),
}

impl Score {
    /// Builds a score from the `cp` / `mate` fields of a UCI info line.
    ///
    /// Mate takes precedence when both are present.
    pub fn from_uci(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(m)) => Some(Score::Mate(m)),
            (Some(c), None) => Some(Score::Centipawns(c)),
            (None, None) => None,
        }
    }

    /// Collapses the score to centipawns using [`MATE_SCORE`].
    pub fn to_centipawns(self) -> i32 {
        match self {
            Score::Centipawns(cp) => cp,
            Score::Mate(n) if n > 0 => MATE_SCORE.saturating_sub(n),
            Score::Mate(n) => (-MATE_SCORE).saturating_sub(n),
        }
    }
}

/// A [`Score`] read from a chosen side's point of view.
///
/// The raw score is kept as reported so that flipping the point of view is
/// exact, including "mated now" (`Mate(0)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    score: Score,
    native_pov: Color,
    pov: Color,
}

impl Evaluation {
    /// Interprets `score`, reported for `native_pov`, from `requested_pov`.
    pub fn from_score(score: Score, native_pov: Color, requested_pov: Color) -> Self {
        Self {
            score,
            native_pov,
            pov: requested_pov,
        }
    }

    /// The side this evaluation is relative to.
    pub fn pov(&self) -> Color {
        self.pov
    }

    /// The same evaluation seen by `pov`.
    pub fn for_pov(self, pov: Color) -> Self {
        Self { pov, ..self }
    }

    /// Signed centipawns for [`Self::pov`], mates mapped to the sentinel.
    pub fn to_centipawns(&self) -> i32 {
        let cp = self.score.to_centipawns();
        if self.pov == self.native_pov {
            cp
        } else {
            cp.saturating_neg()
        }
    }

    /// Moves to mate relative to [`Self::pov`] (negative when `pov` is getting mated).
    pub fn mate_in(&self) -> Option<i32> {
        match self.score {
            Score::Mate(n) if self.pov == self.native_pov => Some(n),
            Score::Mate(n) => Some(n.saturating_neg()),
            Score::Centipawns(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_uci() {
        assert_eq!(Score::from_uci(Some(35), None), Some(Score::Centipawns(35)));
        assert_eq!(Score::from_uci(None, Some(-2)), Some(Score::Mate(-2)));
        assert_eq!(Score::from_uci(Some(10), Some(3)), Some(Score::Mate(3)));
        assert_eq!(Score::from_uci(None, None), None);
    }

    #[test]
    fn test_centipawns_pass_through() {
        let eval = Evaluation::from_score(Score::Centipawns(42), Color::White, Color::White);
        assert_eq!(eval.to_centipawns(), 42);
        assert_eq!(eval.for_pov(Color::Black).to_centipawns(), -42);
    }

    #[test]
    fn test_mate_sentinel() {
        assert_eq!(Score::Mate(1).to_centipawns(), MATE_SCORE - 1);
        assert_eq!(Score::Mate(3).to_centipawns(), MATE_SCORE - 3);
        assert_eq!(Score::Mate(-2).to_centipawns(), -MATE_SCORE + 2);
        assert_eq!(Score::Mate(0).to_centipawns(), -MATE_SCORE);
    }

    #[test]
    fn test_mated_now_flips_to_winning() {
        let mated = Evaluation::from_score(Score::Mate(0), Color::Black, Color::Black);
        assert_eq!(mated.to_centipawns(), -MATE_SCORE);
        let winner = mated.for_pov(Color::White);
        assert_eq!(winner.to_centipawns(), MATE_SCORE);
        assert_eq!(winner.mate_in(), Some(0));
    }

    #[test]
    fn test_mate_in_relative_to_pov() {
        let eval = Evaluation::from_score(Score::Mate(2), Color::White, Color::Black);
        assert_eq!(eval.mate_in(), Some(-2));
        assert_eq!(eval.to_centipawns(), -(MATE_SCORE - 2));
        assert_eq!(eval.pov(), Color::Black);
    }

    proptest! {
        #[test]
        fn flipping_pov_negates(cp in -10_000i32..10_000, native_white in any::<bool>()) {
            let native = if native_white { Color::White } else { Color::Black };
            let same = Evaluation::from_score(Score::Centipawns(cp), native, native);
            let other = Evaluation::from_score(Score::Centipawns(cp), native, native.opposite());
            prop_assert_eq!(other.to_centipawns(), -same.to_centipawns());
        }

        #[test]
        fn mates_stay_near_sentinel(n in -1000i32..=1000) {
            let cp = Score::Mate(n).to_centipawns();
            prop_assert!(cp.abs() >= MATE_SCORE - 1000);
            prop_assert_eq!(cp > 0, n > 0);
        }
    }
}

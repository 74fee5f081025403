use crate::chess::Color;
use derive_more::Display;

/// One of the possible outcomes of a game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Outcome {
    #[display(fmt = "the {_0} player captured the enemy commander")]
    CommanderCaptured(Color),

    #[display(fmt = "checkmate by the {_0} player")]
    Checkmate(Color),

    #[display(fmt = "stalemate")]
    Stalemate,
}

impl Outcome {
    /// Whether neither side has won.
    pub fn is_draw(&self) -> bool {
        !self.is_decisive()
    }

    /// Whether one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::CommanderCaptured(_) | Outcome::Checkmate(_))
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::CommanderCaptured(c) | Outcome::Checkmate(c) => Some(c),
            Outcome::Stalemate => None,
        }
    }
}

use crate::chess::{Color, Square};
use crate::util::Integer;
use std::num::NonZeroU32;

/// The scalar state of a game, everything but the pieces.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Clock {
    turn: Color,
    halfmoves: u32,
    fullmoves: NonZeroU32,
    commanders: [Option<Square>; 2],
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new(Color::Red, 0, NonZeroU32::MIN)
    }
}

impl Clock {
    /// Constructs a [`Clock`] without any known commander.
    pub fn new(turn: Color, halfmoves: u32, fullmoves: NonZeroU32) -> Self {
        Clock {
            turn,
            halfmoves,
            fullmoves,
            commanders: [None; 2],
        }
    }

    /// The side to move.
    #[inline(always)]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The number of halfmoves since the last capture.
    #[inline(always)]
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    /// The current move number.
    #[inline(always)]
    pub fn fullmoves(&self) -> NonZeroU32 {
        self.fullmoves
    }

    /// Where the commander of a [`Color`] stands, if anywhere.
    #[inline(always)]
    pub fn commander(&self, c: Color) -> Option<Square> {
        self.commanders[c.index()]
    }

    /// This clock with another side to move.
    #[inline(always)]
    pub fn with_turn(mut self, c: Color) -> Self {
        self.turn = c;
        self
    }

    /// This clock with the commander of a [`Color`] moved.
    #[inline(always)]
    pub fn with_commander(mut self, c: Color, sq: Option<Square>) -> Self {
        self.commanders[c.index()] = sq;
        self
    }

    /// This clock once the side to move is done.
    pub fn advance(mut self, capture: bool) -> Self {
        self.halfmoves = if capture {
            0
        } else {
            self.halfmoves.saturating_add(1)
        };

        if self.turn == Color::Blue {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }

        let turn = !self.turn;
        self.with_turn(turn)
    }
}

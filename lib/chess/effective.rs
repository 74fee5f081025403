use crate::chess::{Bitboard, Board, Color, Overlay, Piece, Role, Square};

/// The board as seen through the staged changes of an active deploy, if any.
#[derive(Debug, Copy, Clone)]
pub struct Effective<'a> {
    board: &'a Board,
    overlay: Option<&'a Overlay>,
}

impl<'a> Effective<'a> {
    /// Layers an optional [`Overlay`] over a [`Board`].
    #[inline(always)]
    pub fn new(board: &'a Board, overlay: Option<&'a Overlay>) -> Self {
        Effective { board, overlay }
    }

    /// The [`Piece`] on a [`Square`], staged changes first.
    #[inline(always)]
    pub fn get(&self, sq: Square) -> Option<&'a Piece> {
        match self.overlay.and_then(|o| o.get(&sq)) {
            Some(p) => p.as_ref(),
            None => self.board.get(sq),
        }
    }

    /// [`Square`]s occupied by a [`Color`].
    pub fn by_color(&self, c: Color) -> Bitboard {
        let mut bb = self.board.by_color(c);
        for (&sq, p) in self.overlay.into_iter().flatten() {
            match p {
                Some(p) if p.color() == c => bb.insert(sq),
                _ => bb.remove(sq),
            }
        }

        bb
    }

    /// [`Square`]s occupied by any piece.
    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.by_color(Color::Red) | self.by_color(Color::Blue)
    }

    /// An iterator over the pieces of a [`Color`] and their squares.
    pub fn pieces(&self, c: Color) -> impl Iterator<Item = (Square, &'a Piece)> + '_ {
        self.by_color(c)
            .into_iter()
            .filter_map(|sq| Some((sq, self.get(sq)?)))
    }

    /// The square holding the commander of a [`Color`], carried or not.
    pub fn commander(&self, c: Color) -> Option<Square> {
        self.pieces(c)
            .find(|(_, p)| p.contains(Role::Commander))
            .map(|(sq, _)| sq)
    }

    /// Flattens the staged changes into a standalone [`Board`].
    pub fn to_board(&self) -> Board {
        let mut board = self.board.clone();
        for (&sq, p) in self.overlay.into_iter().flatten() {
            board.set(sq, p.clone());
        }

        board
    }
}

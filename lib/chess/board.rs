use crate::chess::{Bitboard, Color, File, Piece, Rank, Role, Square};
use crate::util::Integer;
use std::fmt::{self, Write};
use std::ops::Index;

/// The board, a dumb container of [`Piece`]s.
///
/// Placement rules are enforced by the callers, the board only keeps its
/// per color occupancy in sync with its squares.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Board {
    squares: [Option<Piece>; Square::COUNT],
    colors: [Bitboard; 2],
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Board {
            squares: std::array::from_fn(|_| None),
            colors: [Bitboard::empty(); 2],
        }
    }
}

impl Board {
    /// The [`Piece`] on a [`Square`], if any.
    #[inline(always)]
    pub fn get(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index()].as_ref()
    }

    /// Replaces what is on a [`Square`], returning what was there.
    pub fn set(&mut self, sq: Square, p: Option<Piece>) -> Option<Piece> {
        for bb in &mut self.colors {
            bb.remove(sq);
        }

        if let Some(p) = &p {
            self.colors[p.color().index()].insert(sq);
        }

        std::mem::replace(&mut self.squares[sq.index()], p)
    }

    /// [`Square`]s occupied by a [`Color`].
    #[inline(always)]
    pub fn by_color(&self, c: Color) -> Bitboard {
        self.colors[c.index()]
    }

    /// [`Square`]s occupied by any piece.
    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// An iterator over the pieces of a [`Color`] and their squares.
    pub fn pieces(&self, c: Color) -> impl Iterator<Item = (Square, &Piece)> + '_ {
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
}

impl Index<Square> for Board {
    type Output = Option<Piece>;

    #[inline(always)]
    fn index(&self, sq: Square) -> &Self::Output {
        &self.squares[sq.index()]
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Board(")?;
        for rank in Rank::iter().rev() {
            f.write_char('\n')?;
            for file in File::iter() {
                match self.get(Square::new(file, rank)) {
                    None => f.write_char('.')?,
                    Some(p) => write!(f, "{p}")?,
                }
            }
        }

        f.write_str("\n)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::vec, prelude::*};
    use test_strategy::proptest;

    #[proptest]
    fn default_board_is_empty(sq: Square) {
        let board = Board::default();
        assert_eq!(board.get(sq), None);
        assert!(board.occupied().is_empty());
    }

    #[proptest]
    fn set_keeps_occupancy_in_sync(
        #[strategy(vec((any::<Square>(), any::<Option<Piece>>()), 0..32))] edits: Vec<(
            Square,
            Option<Piece>,
        )>,
    ) {
        let mut board = Board::default();
        for (sq, p) in edits {
            board.set(sq, p);
        }

        for c in Color::iter() {
            for sq in Square::iter() {
                let owned = board.get(sq).map(|p| p.color()) == Some(c);
                assert_eq!(board.by_color(c).contains(sq), owned);
            }
        }
    }

    #[proptest]
    fn set_returns_the_replaced_piece(sq: Square, a: Piece, b: Piece) {
        let mut board = Board::default();
        assert_eq!(board.set(sq, Some(a.clone())), None);
        assert_eq!(board.set(sq, Some(b)), Some(a));
    }

    #[test]
    fn commander_may_be_carried() {
        let mut board = Board::default();
        let sq = "d4".parse().unwrap();
        board.set(sq, Some("(TC)".parse().unwrap()));
        assert_eq!(board.commander(Color::Red), Some(sq));
        assert_eq!(board.commander(Color::Blue), None);
    }

    #[proptest]
    fn cloned_boards_do_not_share_stacks(sq: Square) {
        let mut board = Board::default();
        board.set(sq, Some("(NFT)".parse().unwrap()));
        let snapshot = board.clone();
        board.set(sq, board.get(sq).and_then(|p| p.without(Role::Tank)));
        assert_ne!(board, snapshot);
        assert_eq!(snapshot.get(sq).map(|p| p.len()), Some(3));
    }
}

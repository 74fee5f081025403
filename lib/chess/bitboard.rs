use crate::chess::{File, Rank, Square};
use crate::util::Integer;
use std::fmt::{self, Write};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

const WORDS: usize = (Square::COUNT + 63) / 64;

/// A set of squares on the board.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Bitboard([u64; WORDS]);

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('\n')?;
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let sq = Square::new(file, rank);
                f.write_char(if self.contains(sq) { '■' } else { '◻' })?;
                f.write_char(if file < File::K { ' ' } else { '\n' })?;
            }
        }

        Ok(())
    }
}

impl Bitboard {
    /// An empty board.
    #[inline(always)]
    pub const fn empty() -> Self {
        Bitboard([0; WORDS])
    }

    /// A full board.
    #[inline(always)]
    pub fn full() -> Self {
        !Self::empty()
    }

    /// The number of squares in the set.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Whether this [`Square`] is in the set.
    #[inline(always)]
    pub fn contains(&self, sq: Square) -> bool {
        let i = sq.index();
        self.0[i / 64] & (1 << (i % 64)) != 0
    }

    /// Adds a [`Square`] to the set.
    #[inline(always)]
    pub fn insert(&mut self, sq: Square) {
        let i = sq.index();
        self.0[i / 64] |= 1 << (i % 64);
    }

    /// Removes a [`Square`] from the set.
    #[inline(always)]
    pub fn remove(&mut self, sq: Square) {
        let i = sq.index();
        self.0[i / 64] &= !(1 << (i % 64));
    }

    /// A copy of this set with a [`Square`] added.
    #[inline(always)]
    pub fn with(mut self, sq: Square) -> Self {
        self.insert(sq);
        self
    }

    /// A copy of this set with a [`Square`] removed.
    #[inline(always)]
    pub fn without(mut self, sq: Square) -> Self {
        self.remove(sq);
        self
    }

    /// An iterator over the squares in the set, in ascending order.
    #[inline(always)]
    pub fn iter(&self) -> Squares {
        Squares(*self, 0)
    }
}

impl BitAnd for Bitboard {
    type Output = Self;

    #[inline(always)]
    fn bitand(mut self, rhs: Self) -> Self {
        self &= rhs;
        self
    }
}

impl BitAndAssign for Bitboard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a &= b;
        }
    }
}

impl BitOr for Bitboard {
    type Output = Self;

    #[inline(always)]
    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl BitOrAssign for Bitboard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a |= b;
        }
    }
}

impl Not for Bitboard {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        let mut bb = Bitboard(self.0.map(|w| !w));
        let tail = Square::COUNT % 64;
        if tail > 0 {
            bb.0[WORDS - 1] &= (1 << tail) - 1;
        }

        bb
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut bb = Bitboard::empty();
        for sq in iter {
            bb.insert(sq);
        }

        bb
    }
}

/// An iterator over the squares of a [`Bitboard`].
#[derive(Debug, Clone)]
pub struct Squares(Bitboard, usize);

impl Iterator for Squares {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        while self.1 < WORDS {
            let word = &mut (self.0).0[self.1];
            if *word == 0 {
                self.1 += 1;
            } else {
                let bit = word.trailing_zeros() as usize;
                *word &= *word - 1;
                return Square::from_index(self.1 * 64 + bit);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Squares {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Squares;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::btree_set, prelude::*};
    use std::collections::BTreeSet;
    use test_strategy::proptest;

    #[test]
    fn empty_constructs_board_with_no_squares() {
        assert_eq!(Bitboard::empty().iter().count(), 0);
        assert!(Bitboard::empty().is_empty());
    }

    #[test]
    fn full_constructs_board_with_all_squares() {
        assert_eq!(Bitboard::full().len(), Square::COUNT);
        assert!(Square::iter().eq(Bitboard::full()));
    }

    #[proptest]
    fn iterates_squares_in_ascending_order(#[strategy(btree_set(any::<Square>(), 0..32))] s: BTreeSet<Square>) {
        let bb = Bitboard::from_iter(s.iter().copied());
        assert!(bb.iter().eq(s.iter().copied()));
        assert_eq!(bb.len(), s.len());
    }

    #[proptest]
    fn inserted_squares_are_contained(sq: Square) {
        assert!(Bitboard::empty().with(sq).contains(sq));
        assert!(!Bitboard::full().without(sq).contains(sq));
    }

    #[proptest]
    fn complement_excludes_original_squares(a: Square, b: Square) {
        let bb = a.bitboard() | b.bitboard();
        assert_eq!((!bb & bb), Bitboard::empty());
        assert_eq!((!bb | bb), Bitboard::full());
    }
}

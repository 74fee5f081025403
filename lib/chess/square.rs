use crate::chess::{Bitboard, File, ParseFileError, ParseRankError, Rank, Terrain};
use crate::util::Integer;
use derive_more::{Display, Error, From};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A square on the board.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(transparent)]
pub struct Square(#[cfg_attr(test, strategy(0u8..Square::COUNT as u8))] u8);

impl Square {
    /// The number of squares on the board.
    pub const COUNT: usize = File::COUNT * Rank::COUNT;

    /// Constructs [`Square`] from a pair of [`File`] and [`Rank`].
    #[inline(always)]
    pub fn new(f: File, r: Rank) -> Self {
        Square(r.index() as u8 * File::COUNT as u8 + f.index() as u8)
    }

    /// Constructs [`Square`] from its index, if on the board.
    #[inline(always)]
    pub fn from_index(i: usize) -> Option<Self> {
        (i < Self::COUNT).then_some(Square(i as u8))
    }

    /// This square's [`File`].
    #[inline(always)]
    pub fn file(&self) -> File {
        File::new((self.0 % File::COUNT as u8) as i8)
    }

    /// This square's [`Rank`].
    #[inline(always)]
    pub fn rank(&self) -> Rank {
        Rank::new((self.0 / File::COUNT as u8) as i8)
    }

    /// The square `df` files and `dr` ranks away, if still on the board.
    #[inline(always)]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let f = (self.file().get() + df).convert::<File>()?;
        let r = (self.rank().get() + dr).convert::<Rank>()?;
        Some(Square::new(f, r))
    }

    /// Returns a [`Bitboard`] that only contains this square.
    #[inline(always)]
    pub fn bitboard(self) -> Bitboard {
        Bitboard::empty().with(self)
    }

    /// The [`Terrain`] of this square.
    #[inline(always)]
    pub fn terrain(self) -> Terrain {
        Terrain::of(self)
    }

    /// Whether only naval pieces may stand on this square.
    #[inline(always)]
    pub fn is_water(self) -> bool {
        self.terrain() == Terrain::Water
    }

    /// Whether only land pieces may stand on this square.
    #[inline(always)]
    pub fn is_land(self) -> bool {
        self.terrain() == Terrain::Land
    }

    /// Whether both naval and land pieces may stand on this square.
    #[inline(always)]
    pub fn is_mixed(self) -> bool {
        self.terrain() == Terrain::Mixed
    }

    /// Whether this square is one of the navigable river squares.
    #[inline(always)]
    pub fn is_river(self) -> bool {
        matches!(self.file(), File::D | File::E)
            && matches!(self.rank(), Rank::Sixth | Rank::Seventh)
    }

    /// Whether this square is one end of a bridge.
    #[inline(always)]
    pub fn is_bridge(self) -> bool {
        self.file().has_bridge() && matches!(self.rank(), Rank::Sixth | Rank::Seventh)
    }
}

unsafe impl Integer for Square {
    type Repr = u8;
    const MIN: Self::Repr = 0;
    const MAX: Self::Repr = Square::COUNT as u8 - 1;
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.file(), f)?;
        fmt::Display::fmt(&self.rank(), f)?;
        Ok(())
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseSquareError {
    #[display(fmt = "failed to parse square")]
    InvalidFile(ParseFileError),
    #[display(fmt = "failed to parse square")]
    InvalidRank(ParseRankError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Square::new(s[..i].parse()?, s[i..].parse()?))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

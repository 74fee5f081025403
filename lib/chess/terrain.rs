use crate::chess::{File, Square};
use derive_more::Display;

/// The kind of ground a [`Square`] is made of.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Terrain {
    #[display(fmt = "water")]
    Water,
    #[display(fmt = "mixed")]
    Mixed,
    #[display(fmt = "land")]
    Land,
}

impl Terrain {
    /// The [`Terrain`] of a [`Square`].
    ///
    /// The two westernmost files are open sea, the third one is the coast and the
    /// river mouth is navigable.
    #[inline(always)]
    pub fn of(sq: Square) -> Self {
        match sq.file() {
            File::A | File::B => Terrain::Water,
            File::C => Terrain::Mixed,
            _ if sq.is_river() => Terrain::Mixed,
            _ => Terrain::Land,
        }
    }
}

/// How a piece gets around the board.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Mobility {
    #[display(fmt = "naval")]
    Naval,
    #[display(fmt = "land")]
    Land,
    #[display(fmt = "air")]
    Air,
}

impl Mobility {
    /// Whether a piece with this mobility may stand on the given [`Terrain`].
    #[inline(always)]
    pub fn can_stand(self, t: Terrain) -> bool {
        match self {
            Mobility::Naval => t != Terrain::Land,
            Mobility::Land => t != Terrain::Water,
            Mobility::Air => true,
        }
    }
}

use crate::util::Integer;
use derive_more::{Display, Error};
use std::{ops::Sub, str::FromStr};

/// A row on the board.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(i8)]
pub enum Rank {
    #[display(fmt = "1")]
    First,
    #[display(fmt = "2")]
    Second,
    #[display(fmt = "3")]
    Third,
    #[display(fmt = "4")]
    Fourth,
    #[display(fmt = "5")]
    Fifth,
    #[display(fmt = "6")]
    Sixth,
    #[display(fmt = "7")]
    Seventh,
    #[display(fmt = "8")]
    Eighth,
    #[display(fmt = "9")]
    Ninth,
    #[display(fmt = "10")]
    Tenth,
    #[display(fmt = "11")]
    Eleventh,
    #[display(fmt = "12")]
    Twelfth,
}

impl Rank {
    /// The number of ranks on the board.
    pub const COUNT: usize = 12;

    /// Whether this rank lies on the red side of the river.
    #[inline(always)]
    pub fn is_south(self) -> bool {
        self <= Rank::Sixth
    }
}

unsafe impl Integer for Rank {
    type Repr = i8;
    const MIN: Self::Repr = Rank::First as _;
    const MAX: Self::Repr = Rank::Twelfth as _;
}

impl Sub for Rank {
    type Output = i8;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        self.get() - rhs.get()
    }
}

/// The reason why parsing [`Rank`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(
    fmt = "failed to parse rank, expected number in the range `({}..={})`",
    "Rank::First",
    "Rank::Twelfth"
)]
pub struct ParseRankError;

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Rank::First),
            "2" => Ok(Rank::Second),
            "3" => Ok(Rank::Third),
            "4" => Ok(Rank::Fourth),
            "5" => Ok(Rank::Fifth),
            "6" => Ok(Rank::Sixth),
            "7" => Ok(Rank::Seventh),
            "8" => Ok(Rank::Eighth),
            "9" => Ok(Rank::Ninth),
            "10" => Ok(Rank::Tenth),
            "11" => Ok(Rank::Eleventh),
            "12" => Ok(Rank::Twelfth),
            _ => Err(ParseRankError),
        }
    }
}

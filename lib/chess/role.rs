use crate::chess::Mobility;
use crate::util::Integer;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter, Write};
use std::str::FromStr;

/// The type of a [`Piece`][`crate::chess::Piece`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(u8)]
pub enum Role {
    Commander,
    Infantry,
    Tank,
    Militia,
    Engineer,
    Artillery,
    AntiAir,
    Missile,
    AirForce,
    Navy,
    Headquarter,
}

impl Role {
    /// Carriers in the order they are picked when pieces combine.
    pub const CARRIERS: [Role; 5] = [
        Role::Navy,
        Role::AirForce,
        Role::Tank,
        Role::Engineer,
        Role::Headquarter,
    ];

    /// The lowercase letter of this role.
    #[inline(always)]
    pub fn letter(self) -> char {
        match self {
            Role::Commander => 'c',
            Role::Infantry => 'i',
            Role::Tank => 't',
            Role::Militia => 'm',
            Role::Engineer => 'e',
            Role::Artillery => 'a',
            Role::AntiAir => 'g',
            Role::Missile => 's',
            Role::AirForce => 'f',
            Role::Navy => 'n',
            Role::Headquarter => 'h',
        }
    }

    /// Parses a role from its letter, regardless of case.
    #[inline(always)]
    pub fn from_letter(c: char) -> Option<Self> {
        Role::iter().find(|r| r.letter() == c.to_ascii_lowercase())
    }

    /// How pieces of this role get around.
    #[inline(always)]
    pub fn mobility(self) -> Mobility {
        match self {
            Role::Navy => Mobility::Naval,
            Role::AirForce => Mobility::Air,
            _ => Mobility::Land,
        }
    }

    /// Whether this role may only cross the river over a bridge.
    #[inline(always)]
    pub fn is_heavy(self) -> bool {
        matches!(self, Role::Artillery | Role::AntiAir | Role::Missile)
    }

    /// The base radius of the air defense zone projected by this role.
    #[inline(always)]
    pub fn air_defense(self) -> u8 {
        match self {
            Role::AntiAir | Role::Navy => 1,
            Role::Missile => 2,
            _ => 0,
        }
    }

    /// The slots this role offers when carrying other pieces.
    ///
    /// Each slot holds at most one piece of any of the listed roles.
    pub fn blueprint(self) -> &'static [&'static [Role]] {
        use Role::*;

        match self {
            Navy => &[&[AirForce], &[Commander, Infantry, Militia, Tank]],
            AirForce => &[&[Tank], &[Commander, Infantry, Militia]],
            Tank => &[&[Commander, Infantry, Militia]],
            Engineer => &[&[Artillery, AntiAir, Missile]],
            Headquarter => &[&[Commander]],
            _ => &[],
        }
    }
}

unsafe impl Integer for Role {
    type Repr = u8;
    const MIN: Self::Repr = Role::Commander as _;
    const MAX: Self::Repr = Role::Headquarter as _;
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char(self.letter())
    }
}

/// The reason why parsing [`Role`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse role")]
pub struct ParseRoleError;

impl FromStr for Role {
    type Err = ParseRoleError;

    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Role::from_letter(c).ok_or(ParseRoleError),
            _ => Err(ParseRoleError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;
    use test_strategy::proptest;

    #[test]
    fn role_guarantees_zero_value_optimization() {
        assert_eq!(size_of::<Option<Role>>(), size_of::<Role>());
    }

    #[proptest]
    fn parsing_printed_role_is_an_identity(r: Role) {
        assert_eq!(r.to_string().parse(), Ok(r));
    }

    #[proptest]
    fn parsing_role_fails_if_not_a_known_letter(
        #[filter(!"citmeagsfnh".contains(#c))] c: char,
    ) {
        assert_eq!(c.to_string().parse::<Role>(), Err(ParseRoleError));
    }

    #[proptest]
    fn parsing_role_fails_if_length_not_one(#[filter(#s.chars().count() != 1)] s: String) {
        assert_eq!(s.parse::<Role>(), Err(ParseRoleError));
    }

    #[proptest]
    fn from_letter_ignores_case(r: Role) {
        assert_eq!(Role::from_letter(r.letter().to_ascii_uppercase()), Some(r));
    }

    #[proptest]
    fn only_carriers_have_a_blueprint(r: Role) {
        assert_eq!(!r.blueprint().is_empty(), Role::CARRIERS.contains(&r));
    }

    #[test]
    fn heavy_pieces_are_all_land_pieces() {
        for r in Role::iter().filter(|r| r.is_heavy()) {
            assert_eq!(r.mobility(), Mobility::Land);
        }
    }
}

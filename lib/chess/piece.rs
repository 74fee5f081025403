use crate::chess::{Color, Role, Square};
use derive_more::{DebugCustom, Display, Error};
use std::fmt::{self, Formatter, Write};
use std::{iter, str::FromStr};

/// A piece on the board, possibly carrying other pieces.
///
/// A piece that carries others is a stack. Stacks are plain values, cloning one
/// clones every piece it carries. Carried pieces never carry anything themselves.
#[derive(DebugCustom, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug(fmt = "Piece({self})")]
pub struct Piece {
    color: Color,
    role: Role,
    heroic: bool,
    #[cfg_attr(test, strategy(proptest::strategy::Just(Vec::new())))]
    carrying: Vec<Piece>,
}

/// The reason why a set of pieces cannot form a stack.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum StackCompositionError {
    #[display(fmt = "a stack needs at least one piece")]
    Empty,
    #[display(fmt = "pieces of different colors cannot stack")]
    MixedColors,
    #[display(fmt = "no piece can carry the others")]
    Incompatible,
    #[display(fmt = "the stack cannot stand on `{_0}`")]
    Stranded(#[error(not(source))] Square),
}

impl Piece {
    /// Constructs a simple [`Piece`].
    #[inline(always)]
    pub fn new(color: Color, role: Role) -> Self {
        Piece {
            color,
            role,
            heroic: false,
            carrying: Vec::new(),
        }
    }

    /// This piece with its heroic status set.
    #[inline(always)]
    pub fn heroic(mut self, heroic: bool) -> Self {
        self.heroic = heroic;
        self
    }

    /// Groups pieces into a single stack.
    ///
    /// Every piece is flattened into its units first. The carrier is the
    /// highest priority role whose blueprint holds all the other units.
    pub fn stack<I: IntoIterator<Item = Piece>>(pieces: I) -> Result<Self, StackCompositionError> {
        let mut units: Vec<Piece> = pieces.into_iter().flat_map(Piece::into_units).collect();

        let color = match units.first() {
            None => return Err(StackCompositionError::Empty),
            Some(p) => p.color,
        };

        if units.iter().any(|p| p.color != color) {
            return Err(StackCompositionError::MixedColors);
        }

        for (i, p) in units.iter().enumerate() {
            if units[..i].iter().any(|q| q.role == p.role) {
                return Err(StackCompositionError::Incompatible);
            }
        }

        if units.len() == 1 {
            return Ok(units.remove(0));
        }

        for carrier in Role::CARRIERS {
            if let Some(i) = units.iter().position(|p| p.role == carrier) {
                let mut others = units.clone();
                let mut carrier = others.remove(i);
                if let Some(carrying) = fill(carrier.role.blueprint(), others) {
                    carrier.carrying = carrying;
                    return Ok(carrier);
                }
            }
        }

        Err(StackCompositionError::Incompatible)
    }

    /// This piece's [`Color`].
    #[inline(always)]
    pub fn color(&self) -> Color {
        self.color
    }

    /// This piece's [`Role`], the carrier's if a stack.
    #[inline(always)]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this piece is heroic, the carrier's status if a stack.
    #[inline(always)]
    pub fn is_heroic(&self) -> bool {
        self.heroic
    }

    /// The pieces being carried.
    #[inline(always)]
    pub fn carrying(&self) -> &[Piece] {
        &self.carrying
    }

    /// Whether this piece carries others.
    #[inline(always)]
    pub fn is_stack(&self) -> bool {
        !self.carrying.is_empty()
    }

    /// The number of units in this piece, the carrier included.
    #[inline(always)]
    pub fn len(&self) -> usize {
        1 + self.carrying.len()
    }

    /// A piece is never empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The carrier alone.
    #[inline(always)]
    pub fn carrier(&self) -> Piece {
        Piece {
            carrying: Vec::new(),
            ..*self
        }
    }

    /// An iterator over the units of this piece, carrier first.
    pub fn units(&self) -> impl Iterator<Item = Piece> + '_ {
        iter::once(self.carrier()).chain(self.carrying.iter().cloned())
    }

    /// Consumes this piece into its units, carrier first.
    pub fn into_units(mut self) -> impl Iterator<Item = Piece> {
        let carrying = std::mem::take(&mut self.carrying);
        iter::once(self).chain(carrying)
    }

    /// An iterator over the roles in this piece, carrier first.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        iter::once(self.role).chain(self.carrying.iter().map(|p| p.role))
    }

    /// Whether a unit of this [`Role`] is part of this piece.
    #[inline(always)]
    pub fn contains(&self, role: Role) -> bool {
        self.roles().any(|r| r == role)
    }

    /// The unit of this [`Role`], if part of this piece.
    pub fn unit(&self, role: Role) -> Option<Piece> {
        self.units().find(|p| p.role == role)
    }

    /// What is left after the unit of this [`Role`] leaves.
    ///
    /// The remaining units are regrouped under the best carrier. If they cannot
    /// form a valid stack, the first remaining unit carries the rest.
    pub fn without(&self, role: Role) -> Option<Piece> {
        let mut rest: Vec<Piece> = self.units().filter(|p| p.role != role).collect();
        if rest.is_empty() {
            return None;
        }

        match Piece::stack(rest.clone()) {
            Ok(p) => Some(p),
            Err(_) => {
                let mut carrier = rest.remove(0);
                carrier.carrying = rest;
                Some(carrier)
            }
        }
    }

    /// This piece with the unit of this [`Role`] promoted.
    pub fn promoted(&self, role: Role) -> Piece {
        let mut p = self.clone();
        if p.role == role {
            p.heroic = true;
        }

        for q in &mut p.carrying {
            if q.role == role {
                q.heroic = true;
            }
        }

        p
    }

    /// The air defense radius this piece projects, if any.
    pub fn air_defense(&self) -> u8 {
        self.units()
            .filter(|p| p.role.air_defense() > 0)
            .map(|p| p.role.air_defense() + p.heroic as u8)
            .max()
            .unwrap_or(0)
    }

    fn fmt_unit(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.heroic {
            f.write_char('+')?;
        }

        match self.color {
            Color::Red => f.write_char(self.role.letter().to_ascii_uppercase()),
            Color::Blue => f.write_char(self.role.letter()),
        }
    }
}

fn fill(slots: &[&[Role]], units: Vec<Piece>) -> Option<Vec<Piece>> {
    let (slot, rest) = match slots.split_first() {
        None => return units.is_empty().then(Vec::new),
        Some(split) => split,
    };

    for (i, p) in units.iter().enumerate() {
        if slot.contains(&p.role) {
            let mut others = units.clone();
            let p = others.remove(i);
            if let Some(mut carrying) = fill(rest, others) {
                carrying.insert(0, p);
                return Some(carrying);
            }
        }
    }

    fill(rest, units)
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_stack() {
            f.write_char('(')?;
            self.fmt_unit(f)?;
            for p in &self.carrying {
                p.fmt_unit(f)?;
            }
            f.write_char(')')
        } else {
            self.fmt_unit(f)
        }
    }
}

/// The reason why parsing [`Piece`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse piece")]
pub struct ParsePieceError;

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = match s.strip_prefix('(') {
            None => s,
            Some(s) => s.strip_suffix(')').ok_or(ParsePieceError)?,
        };

        let mut units = Vec::new();
        let mut heroic = false;
        for c in inner.chars() {
            match c {
                '+' if !heroic => heroic = true,
                c if c.is_ascii_alphabetic() => {
                    let role = Role::from_letter(c).ok_or(ParsePieceError)?;
                    let color = if c.is_ascii_uppercase() {
                        Color::Red
                    } else {
                        Color::Blue
                    };

                    units.push(Piece::new(color, role).heroic(heroic));
                    heroic = false;
                }
                _ => return Err(ParsePieceError),
            }
        }

        if heroic || units.is_empty() || (units.len() > 1) != (inner.len() < s.len()) {
            return Err(ParsePieceError);
        }

        Piece::stack(units).map_err(|_| ParsePieceError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    fn red(role: Role) -> Piece {
        Piece::new(Color::Red, role)
    }

    #[proptest]
    fn simple_piece_is_its_only_unit(p: Piece) {
        assert_eq!(p.units().collect::<Vec<_>>(), vec![p.clone()]);
        assert_eq!(p.len(), 1);
    }

    #[proptest]
    fn parsing_printed_piece_is_an_identity(p: Piece) {
        assert_eq!(p.to_string().parse(), Ok(p));
    }

    #[test]
    fn stack_picks_carrier_by_priority() {
        let p = Piece::stack([red(Role::Infantry), red(Role::Tank)]).unwrap();
        assert_eq!(p.role(), Role::Tank);
        assert_eq!(p.carrying(), &[red(Role::Infantry)]);

        let p = Piece::stack([red(Role::Tank), red(Role::AirForce), red(Role::Navy)]).unwrap();
        assert_eq!(p.role(), Role::Navy);
        assert_eq!(p.carrying(), &[red(Role::AirForce), red(Role::Tank)]);
    }

    #[test]
    fn stack_orders_carried_pieces_by_slot() {
        let a = Piece::stack([red(Role::Navy), red(Role::Militia), red(Role::AirForce)]);
        let b = Piece::stack([red(Role::AirForce), red(Role::Navy), red(Role::Militia)]);
        assert_eq!(a, b);
        assert_eq!(a.unwrap().to_string(), "(NFM)");
    }

    #[test]
    fn stack_rejects_incompatible_pieces() {
        assert_eq!(
            Piece::stack([red(Role::Infantry), red(Role::Militia)]),
            Err(StackCompositionError::Incompatible)
        );

        assert_eq!(
            Piece::stack([red(Role::Tank), red(Role::Infantry), red(Role::Militia)]),
            Err(StackCompositionError::Incompatible)
        );

        assert_eq!(
            Piece::stack([red(Role::Engineer), red(Role::Engineer)]),
            Err(StackCompositionError::Incompatible)
        );
    }

    #[test]
    fn stack_rejects_mixed_colors() {
        let blue = Piece::new(Color::Blue, Role::Infantry);
        assert_eq!(
            Piece::stack([red(Role::Tank), blue]),
            Err(StackCompositionError::MixedColors)
        );
    }

    #[test]
    fn stack_rejects_nothing() {
        assert_eq!(Piece::stack(Vec::<Piece>::new()), Err(StackCompositionError::Empty));
    }

    #[proptest]
    fn stacking_a_single_piece_is_an_identity(p: Piece) {
        assert_eq!(Piece::stack([p.clone()]), Ok(p));
    }

    #[test]
    fn without_regroups_remaining_units() {
        let p: Piece = "(NFT)".parse().unwrap();
        assert_eq!(p.without(Role::Navy), Some("(FT)".parse().unwrap()));
        assert_eq!(p.without(Role::AirForce), Some("(NT)".parse().unwrap()));
        assert_eq!(
            p.without(Role::Tank).and_then(|p| p.without(Role::Navy)),
            Some(red(Role::AirForce))
        );
    }

    #[proptest]
    fn without_the_only_unit_leaves_nothing(p: Piece) {
        assert_eq!(p.without(p.role()), None);
    }

    #[test]
    fn heroic_status_belongs_to_each_unit() {
        let p: Piece = "(+TI)".parse().unwrap();

        assert!(p.is_heroic());
        assert!(!p.carrying()[0].is_heroic());
        assert!(p.promoted(Role::Infantry).carrying()[0].is_heroic());
        assert_eq!(p.promoted(Role::Infantry).to_string(), "(+T+I)");
    }

    #[test]
    fn parsing_piece_fails_for_malformed_stacks() {
        assert_eq!("()".parse::<Piece>(), Err(ParsePieceError));
        assert_eq!("(T".parse::<Piece>(), Err(ParsePieceError));
        assert_eq!("TI".parse::<Piece>(), Err(ParsePieceError));
        assert_eq!("+".parse::<Piece>(), Err(ParsePieceError));
        assert_eq!("(IM)".parse::<Piece>(), Err(ParsePieceError));
        assert_eq!("x".parse::<Piece>(), Err(ParsePieceError));
    }

    #[test]
    fn air_defense_counts_carried_units() {
        let p: Piece = "(E+S)".parse().unwrap();
        assert_eq!(p.air_defense(), 3);
        assert_eq!(red(Role::AntiAir).heroic(true).air_defense(), 2);
        assert_eq!(red(Role::Tank).air_defense(), 0);
    }
}

use crate::chess::Role;

/// A distance long enough to cross the whole board.
pub const UNLIMITED: u8 = 12;

/// How far a piece reaches along orthogonal and diagonal lines.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Span {
    pub orthogonal: u8,
    pub diagonal: u8,
}

impl Span {
    /// Constructs a [`Span`].
    #[inline(always)]
    pub const fn new(orthogonal: u8, diagonal: u8) -> Self {
        Span {
            orthogonal,
            diagonal,
        }
    }

    /// The reach along a line.
    #[inline(always)]
    pub fn along(self, diagonal: bool) -> u8 {
        if diagonal {
            self.diagonal
        } else {
            self.orthogonal
        }
    }

    /// The longest reach in any direction.
    #[inline(always)]
    pub fn max(self) -> u8 {
        self.orthogonal.max(self.diagonal)
    }

    /// The span of a heroic piece.
    ///
    /// Finite reaches grow by one and diagonals open up to the orthogonal reach.
    pub fn heroic(self) -> Self {
        let grow = |n: u8| if n >= UNLIMITED { UNLIMITED } else { n + 1 };
        let orthogonal = grow(self.orthogonal);
        let diagonal = match self.diagonal {
            0 => orthogonal,
            d => grow(d),
        };

        Span::new(orthogonal, diagonal)
    }

    /// One step shorter, except where unlimited.
    pub fn shorter(self) -> Self {
        let shrink = |n: u8| if n >= UNLIMITED { n } else { n.saturating_sub(1) };
        Span::new(shrink(self.orthogonal), shrink(self.diagonal))
    }
}

/// How other pieces standing in the way affect a piece.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Blocking {
    /// Any piece in the way stops both moves and captures.
    Blocked,
    /// Moves are blocked, captures may pass over exactly one piece.
    ShootOver,
    /// Moves are blocked, captures are not.
    Moves,
    /// Nothing in the way matters.
    Ignored,
}

/// The movement and capture rules of a piece.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Rules {
    pub movement: Span,
    pub capture: Span,
    pub blocking: Blocking,
}

impl Rules {
    /// The rules of a piece of the given [`Role`].
    pub fn of(role: Role, heroic: bool) -> Self {
        use Blocking::*;

        let (movement, capture, blocking) = match role {
            Role::Commander => (Span::new(UNLIMITED, 0), Span::new(1, 0), Blocked),
            Role::Infantry | Role::Engineer | Role::AntiAir => {
                (Span::new(1, 0), Span::new(1, 0), Blocked)
            }
            Role::Militia => (Span::new(1, 1), Span::new(1, 1), Blocked),
            Role::Tank => (Span::new(2, 0), Span::new(2, 0), ShootOver),
            Role::Artillery => (Span::new(3, 3), Span::new(3, 3), Ignored),
            Role::Missile => (Span::new(2, 1), Span::new(2, 1), Ignored),
            Role::AirForce => (
                Span::new(UNLIMITED, UNLIMITED),
                Span::new(UNLIMITED, UNLIMITED),
                Ignored,
            ),
            Role::Navy => (Span::new(4, 4), Span::new(4, 4), Moves),
            Role::Headquarter if heroic => (Span::new(1, 0), Span::new(1, 0), Blocked),
            Role::Headquarter => (Span::new(0, 0), Span::new(0, 0), Blocked),
        };

        if heroic && role != Role::Headquarter {
            Rules {
                movement: movement.heroic(),
                capture: capture.heroic(),
                blocking,
            }
        } else {
            Rules {
                movement,
                capture,
                blocking,
            }
        }
    }

    /// The capture span of an `attacker` against a `target`.
    ///
    /// Navies hit other navies from further away than anything else.
    #[inline(always)]
    pub fn capture_against(&self, attacker: Role, target: Role) -> Span {
        if attacker == Role::Navy && target != Role::Navy {
            self.capture.shorter()
        } else {
            self.capture
        }
    }

    /// Whether a move may go on after passing `blockers` pieces.
    #[inline(always)]
    pub fn moves_past(&self, blockers: usize) -> bool {
        blockers == 0 || self.blocking == Blocking::Ignored
    }

    /// Whether a capture may go on after passing `blockers` pieces.
    #[inline(always)]
    pub fn captures_past(&self, blockers: usize) -> bool {
        match self.blocking {
            Blocking::Blocked => blockers == 0,
            Blocking::ShootOver => blockers <= 1,
            Blocking::Moves | Blocking::Ignored => true,
        }
    }
}

impl Role {
    /// The [`Rules`] of this role.
    #[inline(always)]
    pub fn rules(self, heroic: bool) -> Rules {
        Rules::of(self, heroic)
    }
}

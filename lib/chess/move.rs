use crate::chess::{Piece, Square};
use bitflags::bitflags;
use derive_more::Display;
use std::fmt::{self, Formatter, Write};

bitflags! {
    /// Characteristics of a [`Move`].
    #[derive(Default)]
    pub struct MoveKind: u8 {
        const NORMAL =          0b00000001;
        const CAPTURE =         0b00000010;
        const STAY_CAPTURE =    0b00000100;
        const SUICIDE_CAPTURE = 0b00001000;
        const COMBINE =         0b00010000;
        const DEPLOY =          0b00100000;
    }
}

/// Where a unit leaving a stack ends up.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Landing {
    /// On an empty square.
    Vacant,
    /// On a square it captured.
    Capture(Piece),
    /// Back on the stack, after attacking from afar.
    StayCapture(Piece),
    /// Nowhere, destroyed along with its target.
    SuicideCapture(Piece),
    /// On top of another unit of the same deploy.
    Recombine(Piece),
}

/// One unit leaving a stack as part of a deploy.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DeployStep {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub landing: Landing,
}

impl DeployStep {
    /// The characteristics of this step.
    pub fn kind(&self) -> MoveKind {
        MoveKind::DEPLOY
            | match self.landing {
                Landing::Vacant => MoveKind::NORMAL,
                Landing::Capture(_) => MoveKind::CAPTURE,
                Landing::StayCapture(_) => MoveKind::STAY_CAPTURE,
                Landing::SuicideCapture(_) => MoveKind::SUICIDE_CAPTURE,
                Landing::Recombine(_) => MoveKind::COMBINE,
            }
    }

    /// The enemy piece attacked, if any.
    pub fn captured(&self) -> Option<&Piece> {
        match &self.landing {
            Landing::Capture(p) | Landing::StayCapture(p) | Landing::SuicideCapture(p) => Some(p),
            Landing::Vacant | Landing::Recombine(_) => None,
        }
    }
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let flag = match self.landing {
            Landing::Vacant => None,
            Landing::Capture(_) => Some('x'),
            Landing::StayCapture(_) => Some('_'),
            Landing::SuicideCapture(_) => Some('@'),
            Landing::Recombine(_) => Some('&'),
        };

        let role = self.piece.role().letter().to_ascii_uppercase();
        write!(f, "{role}{}>", self.from)?;
        if let Some(flag) = flag {
            f.write_char(flag)?;
        }

        write!(f, "{}", self.to)
    }
}

/// A move, as one of the ways a piece may act.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum Move {
    /// A piece moves to an empty square.
    Normal {
        from: Square,
        to: Square,
        piece: Piece,
    },
    /// A piece takes the place of an enemy piece.
    Capture {
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
    },
    /// A piece removes an enemy piece without moving.
    StayCapture {
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
    },
    /// A piece destroys an enemy piece along with itself.
    SuicideCapture {
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
    },
    /// A piece joins a friendly piece to form a stack.
    Combine {
        from: Square,
        to: Square,
        piece: Piece,
        with: Piece,
    },
    /// A unit leaves a stack.
    Deploy(DeployStep),
    /// A deploy as a whole, once committed.
    DeployComplete {
        from: Square,
        steps: Vec<DeployStep>,
        stay: Vec<Piece>,
    },
}

impl Move {
    /// The square the move starts from.
    pub fn from(&self) -> Square {
        match self {
            Move::Normal { from, .. }
            | Move::Capture { from, .. }
            | Move::StayCapture { from, .. }
            | Move::SuicideCapture { from, .. }
            | Move::Combine { from, .. }
            | Move::Deploy(DeployStep { from, .. })
            | Move::DeployComplete { from, .. } => *from,
        }
    }

    /// The square the move targets.
    ///
    /// A completed deploy targets its origin.
    pub fn to(&self) -> Square {
        match self {
            Move::Normal { to, .. }
            | Move::Capture { to, .. }
            | Move::StayCapture { to, .. }
            | Move::SuicideCapture { to, .. }
            | Move::Combine { to, .. }
            | Move::Deploy(DeployStep { to, .. }) => *to,
            Move::DeployComplete { from, .. } => *from,
        }
    }

    /// The piece acting, `None` for a completed deploy.
    pub fn piece(&self) -> Option<&Piece> {
        match self {
            Move::Normal { piece, .. }
            | Move::Capture { piece, .. }
            | Move::StayCapture { piece, .. }
            | Move::SuicideCapture { piece, .. }
            | Move::Combine { piece, .. }
            | Move::Deploy(DeployStep { piece, .. }) => Some(piece),
            Move::DeployComplete { .. } => None,
        }
    }

    /// The enemy piece attacked, if any.
    pub fn captured(&self) -> Option<&Piece> {
        match self {
            Move::Capture { captured, .. }
            | Move::StayCapture { captured, .. }
            | Move::SuicideCapture { captured, .. } => Some(captured),
            Move::Deploy(step) => step.captured(),
            Move::Normal { .. } | Move::Combine { .. } | Move::DeployComplete { .. } => None,
        }
    }

    /// The characteristics of this move.
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::Normal { .. } => MoveKind::NORMAL,
            Move::Capture { .. } => MoveKind::CAPTURE,
            Move::StayCapture { .. } => MoveKind::STAY_CAPTURE,
            Move::SuicideCapture { .. } => MoveKind::SUICIDE_CAPTURE,
            Move::Combine { .. } => MoveKind::COMBINE,
            Move::Deploy(step) => step.kind(),
            Move::DeployComplete { steps, .. } => steps
                .iter()
                .fold(MoveKind::DEPLOY, |k, s| k | s.kind()),
        }
    }

    /// Whether this is a single step of a deploy.
    #[inline(always)]
    pub fn is_deploy_step(&self) -> bool {
        matches!(self, Move::Deploy(_))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let flag = match self {
            Move::Normal { .. } => '-',
            Move::Capture { .. } => 'x',
            Move::StayCapture { .. } => '_',
            Move::SuicideCapture { .. } => '@',
            Move::Combine { .. } => '&',
            Move::Deploy(step) => return fmt::Display::fmt(step, f),
            Move::DeployComplete { from, steps, stay } => {
                write!(f, "{from}:")?;
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }

                    write!(f, "{step}")?;
                }

                if !stay.is_empty() {
                    f.write_char('=')?;
                    for p in stay {
                        f.write_char(p.role().letter().to_ascii_uppercase())?;
                    }
                }

                return Ok(());
            }
        };

        let role = self.piece().map_or('?', |p| p.role().letter().to_ascii_uppercase());
        write!(f, "{role}{}{flag}{}", self.from(), self.to())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self})")
    }
}

/// A [`Move`] as notation, annotated with whether it attacks the enemy commander.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash)]
#[display(fmt = "{}{}", _0, "if *_1 { \"^\" } else { \"\" }")]
pub struct San(pub Move, pub bool);

use crate::chess::{Board, Clock, Color, DeploySession, File, Game, Piece, Rank, Role, Square};
use crate::util::Integer;
use derive_more::{Display, Error};
use std::fmt::{self, Formatter, Write};
use std::{num::NonZeroU32, str::FromStr};
use tracing::instrument;

/// The reason why parsing a position failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ParsePositionError {
    #[display(fmt = "syntax error at the piece placement field")]
    InvalidPlacement,
    #[display(fmt = "syntax error at the side to move field")]
    InvalidTurn,
    #[display(fmt = "reserved fields must be `-`")]
    InvalidReserved,
    #[display(fmt = "syntax error at the halfmove clock field")]
    InvalidHalfmoveClock,
    #[display(fmt = "syntax error at the fullmove counter field")]
    InvalidFullmoves,
    #[display(fmt = "syntax error at the deploy field")]
    InvalidDeployMarker,
    #[display(fmt = "unspecified syntax error")]
    InvalidSyntax,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let view = self.view();

        for (i, rank) in Rank::iter().rev().enumerate() {
            if i > 0 {
                f.write_char('/')?;
            }

            let mut empty = 0;
            for file in File::iter() {
                match view.get(Square::new(file, rank)) {
                    None => empty += 1,
                    Some(p) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }

                        write!(f, "{p}")?;
                    }
                }
            }

            if empty > 0 {
                write!(f, "{empty}")?;
            }
        }

        let clock = self.clock();
        let turn = clock.turn().letter();
        write!(f, " {turn} - - {} {}", clock.halfmoves(), clock.fullmoves())?;

        if let Some(session) = self.session() {
            write!(f, " {}:", session.origin())?;
            units(f, session.moved(), session.turn())?;
            f.write_char('/')?;
            units(f, session.stay(), session.turn())?;
            f.write_char(':')?;

            if session.overlay().is_empty() {
                f.write_char('-')?;
            }

            for (i, sq) in session.overlay().keys().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }

                match self.board().get(*sq) {
                    None => write!(f, "{sq}=-")?,
                    Some(p) => write!(f, "{sq}={p}")?,
                }
            }
        }

        Ok(())
    }
}

fn units(f: &mut Formatter<'_>, pieces: &[Piece], turn: Color) -> fmt::Result {
    if pieces.is_empty() {
        return f.write_char('-');
    }

    for p in pieces {
        match turn {
            Color::Red => f.write_char(p.role().letter().to_ascii_uppercase())?,
            Color::Blue => f.write_char(p.role().letter())?,
        }
    }

    Ok(())
}

fn placement(s: &str) -> Result<Board, ParsePositionError> {
    use ParsePositionError::InvalidPlacement;

    let rows: Vec<&str> = s.split('/').collect();
    if rows.len() != Rank::iter().len() {
        return Err(InvalidPlacement);
    }

    let mut board = Board::default();
    for (rank, row) in Rank::iter().rev().zip(rows) {
        let mut files = File::iter();
        let mut rest = row;

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());

            if digits > 0 {
                let n: usize = match rest[..digits].parse() {
                    Ok(n) if n > 0 && !rest.starts_with('0') => n,
                    _ => return Err(InvalidPlacement),
                };

                for _ in 0..n {
                    files.next().ok_or(InvalidPlacement)?;
                }

                rest = &rest[digits..];
            } else {
                let len = match rest.starts_with('(') {
                    true => rest.find(')').map_or(rest.len(), |i| i + 1),
                    false => rest
                        .find(|c: char| c.is_ascii_alphabetic())
                        .map_or(rest.len(), |i| i + 1),
                };

                let piece: Piece = rest[..len].parse().map_err(|_| InvalidPlacement)?;
                let file = files.next().ok_or(InvalidPlacement)?;
                board.set(Square::new(file, rank), Some(piece));
                rest = &rest[len..];
            }
        }

        if files.next().is_some() {
            return Err(InvalidPlacement);
        }
    }

    Ok(board)
}

fn roles(s: &str) -> Result<Vec<Role>, ParsePositionError> {
    match s {
        "-" => Ok(Vec::new()),
        "" => Err(ParsePositionError::InvalidDeployMarker),
        _ => s
            .chars()
            .map(Role::from_letter)
            .collect::<Option<_>>()
            .ok_or(ParsePositionError::InvalidDeployMarker),
    }
}

/// Rebuilds the real board and the deploy in progress out of the board as the
/// players see it and a marker of the form `<origin>:<moved>/<stay>:<square>=<piece>,...`.
///
/// The last field lists what the real board holds on every square the deploy has changed.
fn marker(s: &str, view: Board, turn: Color) -> Result<(Board, DeploySession), ParsePositionError> {
    use ParsePositionError::InvalidDeployMarker;

    let (origin, rest) = s.split_once(':').ok_or(InvalidDeployMarker)?;
    let (accounts, changes) = rest.split_once(':').ok_or(InvalidDeployMarker)?;
    let (moved, stay) = accounts.split_once('/').ok_or(InvalidDeployMarker)?;

    let origin: Square = origin.parse().map_err(|_| InvalidDeployMarker)?;
    let (moved, stay) = (roles(moved)?, roles(stay)?);

    let mut underlay: Vec<(Square, Option<Piece>)> = Vec::new();
    if changes != "-" {
        for change in changes.split(',') {
            let (sq, p) = change.split_once('=').ok_or(InvalidDeployMarker)?;
            let sq: Square = sq.parse().map_err(|_| InvalidDeployMarker)?;
            let p = match p {
                "-" => None,
                _ => Some(p.parse::<Piece>().map_err(|_| InvalidDeployMarker)?),
            };

            if underlay.iter().any(|(s, _)| *s == sq) {
                return Err(InvalidDeployMarker);
            }

            underlay.push((sq, p));
        }
    }

    let mut board = view.clone();
    for (sq, p) in &underlay {
        board.set(*sq, p.clone());
    }

    let stack = match board.get(origin) {
        Some(p) if p.color() == turn => p.clone(),
        _ => return Err(InvalidDeployMarker),
    };

    let accounted: Vec<Role> = moved.iter().chain(&stay).copied().collect();
    for (i, r) in accounted.iter().enumerate() {
        if !stack.contains(*r) || accounted[..i].contains(r) {
            return Err(InvalidDeployMarker);
        }
    }

    let unit = |r: &Role| stack.unit(*r).ok_or(InvalidDeployMarker);
    let moved = moved.iter().map(unit).collect::<Result<_, _>>()?;
    let stay = stay.iter().map(unit).collect::<Result<_, _>>()?;

    let mut session = DeploySession::restore(origin, turn, stack.clone(), moved, stay);
    for (sq, _) in underlay {
        session.write(&board, sq, view.get(sq).cloned());
    }

    Ok((board, session))
}

impl FromStr for Game {
    type Err = ParsePositionError;

    #[instrument(level = "trace", err)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParsePositionError::*;

        let fields: Vec<&str> = s.split_ascii_whitespace().collect();
        let (board, turn, reserved, halfmoves, fullmoves, deploy) = match fields[..] {
            [b, t, r, e, h, f] => (b, t, [r, e], h, f, None),
            [b, t, r, e, h, f, d] => (b, t, [r, e], h, f, Some(d)),
            _ => return Err(InvalidSyntax),
        };

        let board = placement(board)?;

        let turn = match turn {
            "r" => Color::Red,
            "b" => Color::Blue,
            _ => return Err(InvalidTurn),
        };

        if reserved != ["-", "-"] {
            return Err(InvalidReserved);
        }

        let halfmoves: u32 = halfmoves.parse().map_err(|_| InvalidHalfmoveClock)?;
        let fullmoves: NonZeroU32 = fullmoves.parse().map_err(|_| InvalidFullmoves)?;

        let (board, session) = match deploy {
            None => (board, None),
            Some(d) => {
                let (board, session) = marker(d, board, turn)?;
                (board, Some(session))
            }
        };

        let clock = Clock::new(turn, halfmoves, fullmoves);
        Ok(Game::new(board, clock, session))
    }
}

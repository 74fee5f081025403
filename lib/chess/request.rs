use crate::chess::{Landing, Move, ParseSquareError, Role, Square};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A request to play a move, as loosely as the caller cares to specify it.
///
/// Unset fields match anything.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    #[serde(default)]
    pub piece: Option<Role>,
    #[serde(default)]
    pub capture: Option<bool>,
    #[serde(default)]
    pub stay: Option<bool>,
    #[serde(default)]
    pub suicide: Option<bool>,
    #[serde(default)]
    pub combine: Option<bool>,
    #[serde(default)]
    pub deploy: Option<bool>,
}

impl MoveRequest {
    /// A request for whatever moves from `from` to `to`.
    pub fn new(from: Square, to: Square) -> Self {
        MoveRequest {
            from,
            to,
            piece: None,
            capture: None,
            stay: None,
            suicide: None,
            combine: None,
            deploy: None,
        }
    }

    /// Whether the request explicitly asks for an attack.
    pub fn wants_capture(&self) -> bool {
        [self.capture, self.stay, self.suicide].contains(&Some(true))
    }

    /// Whether a [`Move`] satisfies this request.
    pub fn matches(&self, m: &Move) -> bool {
        let (stay, suicide, combine) = match m {
            Move::StayCapture { .. } => (true, false, false),
            Move::SuicideCapture { .. } => (false, true, false),
            Move::Combine { .. } => (false, false, true),
            Move::Deploy(step) => match step.landing {
                Landing::StayCapture(_) => (true, false, false),
                Landing::SuicideCapture(_) => (false, true, false),
                Landing::Recombine(_) => (false, false, true),
                Landing::Vacant | Landing::Capture(_) => (false, false, false),
            },
            _ => (false, false, false),
        };

        let is = |flag: Option<bool>, value: bool| flag.map_or(true, |f| f == value);

        m.from() == self.from
            && m.to() == self.to
            && self.piece.map_or(true, |r| m.piece().map(|p| p.role()) == Some(r))
            && is(self.capture, m.captured().is_some())
            && is(self.stay, stay)
            && is(self.suicide, suicide)
            && is(self.combine, combine)
            && is(self.deploy, m.is_deploy_step())
    }
}

/// The reason why parsing [`MoveRequest`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseMoveRequestError {
    #[display(fmt = "failed to parse move, invalid square")]
    InvalidSquare(ParseSquareError),
    #[display(fmt = "failed to parse move, expected `[ROLE]<from>[>][-x_@&]<to>[^]`")]
    #[from(ignore)]
    InvalidSyntax,
}

fn split_square(s: &str) -> Result<(Square, &str), ParseMoveRequestError> {
    let n = s
        .char_indices()
        .skip(1)
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);

    if n < 2 {
        return Err(ParseMoveRequestError::InvalidSyntax);
    }

    Ok((s[..n].parse()?, &s[n..]))
}

impl FromStr for MoveRequest {
    type Err = ParseMoveRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix('^').unwrap_or(s);

        let (piece, s) = match s.chars().next() {
            Some(c) if c.is_ascii_uppercase() => {
                let role = Role::from_letter(c).ok_or(ParseMoveRequestError::InvalidSyntax)?;
                (Some(role), &s[1..])
            }

            _ => (None, s),
        };

        let (from, s) = split_square(s)?;
        let (deploy, s) = match s.strip_prefix('>') {
            Some(s) => (Some(true), s),
            None => (None, s),
        };

        let mut request = MoveRequest {
            piece,
            deploy,
            ..MoveRequest::new(from, from)
        };

        let s = match s.chars().next() {
            Some('-') => {
                request.capture = Some(false);
                request.combine = Some(false);
                &s[1..]
            }

            Some('x') => {
                request.capture = Some(true);
                request.stay = Some(false);
                request.suicide = Some(false);
                &s[1..]
            }

            Some('_') => {
                request.stay = Some(true);
                &s[1..]
            }

            Some('@') => {
                request.suicide = Some(true);
                &s[1..]
            }

            Some('&') => {
                request.combine = Some(true);
                &s[1..]
            }

            _ => s,
        };

        let (to, rest) = split_square(s)?;
        if !rest.is_empty() {
            return Err(ParseMoveRequestError::InvalidSyntax);
        }

        request.to = to;
        Ok(request)
    }
}

/// One unit of a [`DeployRequest`].
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DeployMove {
    pub piece: Role,
    pub to: Square,
    #[serde(default)]
    pub capture: Option<bool>,
}

/// A request to deploy a whole stack at once.
///
/// Every unit of the stack must either move or stay, exactly once.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DeployRequest {
    pub from: Square,
    pub moves: Vec<DeployMove>,
    #[serde(default)]
    pub stay: Vec<Role>,
}

impl DeployRequest {
    /// The [`MoveRequest`]s for each of the units moving.
    pub fn steps(&self) -> impl Iterator<Item = MoveRequest> + '_ {
        self.moves.iter().map(|m| MoveRequest {
            piece: Some(m.piece),
            capture: m.capture,
            deploy: Some(true),
            ..MoveRequest::new(self.from, m.to)
        })
    }

    /// Every role the request accounts for.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.moves.iter().map(|m| m.piece).chain(self.stay.iter().copied())
    }
}

/// Any of the shapes a move may be submitted in.
#[derive(Debug, Clone, Eq, PartialEq, Hash, From)]
pub enum Input {
    Notation(String),
    Request(MoveRequest),
    Deploy(DeployRequest),
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Notation(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Color, DeployStep, Piece};
    use test_strategy::proptest;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn parses_full_notation() {
        let r: MoveRequest = "Tc3>xc5^".parse().unwrap();
        assert_eq!(r.piece, Some(Role::Tank));
        assert_eq!(r.from, sq("c3"));
        assert_eq!(r.to, sq("c5"));
        assert_eq!(r.deploy, Some(true));
        assert_eq!(r.capture, Some(true));
        assert_eq!(r.stay, Some(false));
    }

    #[test]
    fn role_and_flag_are_optional() {
        let r: MoveRequest = "c3c10".parse().unwrap();
        assert_eq!(r, MoveRequest::new(sq("c3"), sq("c10")));

        let r: MoveRequest = "k12_a1".parse().unwrap();
        assert_eq!(r.stay, Some(true));
        assert_eq!(r.piece, None);
    }

    #[test]
    fn lowercase_letters_are_files() {
        let r: MoveRequest = "a1-a2".parse().unwrap();
        assert_eq!(r.piece, None);
        assert_eq!(r.from, sq("a1"));
    }

    #[test]
    fn malformed_notation_is_rejected() {
        for s in ["", "c3", "Tc3", "c3-", "c3-c4x", "Xc3-c4", "c3?c4", "3c-4c"] {
            assert!(s.parse::<MoveRequest>().is_err(), "{s}");
        }

        assert!(matches!(
            "z3-c4".parse::<MoveRequest>(),
            Err(ParseMoveRequestError::InvalidSquare(_))
        ));
    }

    #[proptest]
    fn printed_moves_match_their_own_notation(from: Square, to: Square) {
        let piece = Piece::new(Color::Red, Role::Militia);
        let captured = Piece::new(Color::Blue, Role::Militia);

        for m in [
            Move::Normal {
                from,
                to,
                piece: piece.clone(),
            },
            Move::Capture {
                from,
                to,
                piece: piece.clone(),
                captured: captured.clone(),
            },
            Move::StayCapture {
                from,
                to,
                piece: piece.clone(),
                captured: captured.clone(),
            },
            Move::Deploy(DeployStep {
                from,
                to,
                piece: piece.clone(),
                landing: Landing::SuicideCapture(captured.clone()),
            }),
        ] {
            let r: MoveRequest = m.to_string().parse()?;
            assert!(r.matches(&m));
        }
    }

    #[test]
    fn requests_deserialize_from_ron() {
        let r: MoveRequest = ron::from_str(r#"(from: "c3", to: "c5", piece: Some(Tank))"#).unwrap();
        assert_eq!(r.piece, Some(Role::Tank));
        assert_eq!(r.capture, None);

        let d: DeployRequest = ron::from_str(
            r#"(from: "c3", moves: [(piece: Tank, to: "c4"), (piece: Infantry, to: "d3")])"#,
        )
        .unwrap();

        assert_eq!(d.roles().collect::<Vec<_>>(), vec![Role::Tank, Role::Infantry]);
        assert!(d.steps().all(|s| s.deploy == Some(true)));
    }
}

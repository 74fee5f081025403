use crate::chess::{AirDefense, Color, DeploySession, DeployStep, Effective, Flight, FlightPath};
use crate::chess::{Landing, Mobility, Move, Piece, Role, Square, UNLIMITED};

/// The eight directions of travel, orthogonal first.
const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// A square a piece reaches and what it may do there.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Reach {
    /// Move onto an empty square.
    Move(Square),
    /// Join a friendly piece.
    Join(Square),
    /// Attack an enemy piece.
    Strike {
        to: Square,
        capture: bool,
        stay: bool,
        suicide: bool,
    },
}

/// Whether `mover` may come to rest on `to` after leaving `from`.
///
/// Heavy pieces cross the river only by moving straight over a bridge.
pub fn can_stand(mover: &Piece, from: Square, to: Square) -> bool {
    let role = mover.role();
    if !role.mobility().can_stand(to.terrain()) {
        false
    } else if role.is_heavy() && from.rank().is_south() != to.rank().is_south() {
        from.file() == to.file() && from.file().has_bridge()
    } else {
        true
    }
}

fn ray<F: FnMut(Reach)>(
    view: &Effective<'_>,
    from: Square,
    mover: &Piece,
    (df, dr): (i8, i8),
    defense: &AirDefense,
    mut f: F,
) {
    let diagonal = df != 0 && dr != 0;
    let role = mover.role();
    let rules = role.rules(mover.is_heroic());
    let reach = rules.movement.along(diagonal);
    let strike = rules.capture.along(diagonal);
    let flying = role == Role::Commander && !diagonal;
    let airborne = role.mobility() == Mobility::Air;

    let limit = if flying { UNLIMITED } else { reach.max(strike) };

    let mut blockers = 0;
    let mut walled = false;
    let mut path = FlightPath::default();

    for k in 1..=limit as i8 {
        let to = match from.offset(df * k, dr * k) {
            Some(to) => to,
            None => break,
        };

        let flight = match airborne {
            true => path.step(defense.covering(to)),
            false => Flight::Clear,
        };

        if flight == Flight::Grounded {
            break;
        }

        let k = k as u8;
        let moving = k <= reach && !walled && rules.moves_past(blockers);
        let standing = can_stand(mover, from, to);

        match view.get(to) {
            None => {
                if moving && standing && flight == Flight::Clear {
                    f(Reach::Move(to));
                }
            }

            Some(p) if p.color() == mover.color() => {
                if moving && standing && flight == Flight::Clear {
                    let joined = Piece::stack([p.clone(), mover.clone()]);
                    if joined.map_or(false, |s| s.role().mobility().can_stand(to.terrain())) {
                        f(Reach::Join(to));
                    }
                }
            }

            Some(p) => {
                let span = rules.capture_against(role, p.role()).along(diagonal);
                let striking = k <= span && rules.captures_past(blockers);
                let facing = flying && blockers == 0 && p.contains(Role::Commander);

                if striking || facing {
                    f(match flight {
                        Flight::Kamikaze => Reach::Strike {
                            to,
                            capture: false,
                            stay: false,
                            suicide: true,
                        },

                        _ if airborne => Reach::Strike {
                            to,
                            capture: true,
                            stay: true,
                            suicide: p.contains(Role::Commander),
                        },

                        _ => Reach::Strike {
                            to,
                            capture: standing,
                            stay: !standing,
                            suicide: false,
                        },
                    });
                }
            }
        }

        if view.get(to).is_some() {
            blockers += 1;
        }

        walled |= !standing;

        let moves_on = k < reach && !walled && rules.moves_past(blockers);
        let strikes_on = k < strike && rules.captures_past(blockers);
        if !moves_on && !strikes_on && !(flying && blockers == 0) {
            break;
        }
    }
}

/// Every square `mover` reaches from `from`.
///
/// The `defense` must be the air defense of the mover's opponent.
pub fn reach(
    view: &Effective<'_>,
    from: Square,
    mover: &Piece,
    defense: &AirDefense,
) -> Vec<Reach> {
    let mut reached = Vec::new();
    for dir in DIRECTIONS {
        ray(view, from, mover, dir, defense, |r| reached.push(r));
    }

    reached
}

/// Whether `unit` standing on `from` may attack `to`.
pub fn strikes(
    view: &Effective<'_>,
    from: Square,
    unit: &Piece,
    to: Square,
    defense: &AirDefense,
) -> bool {
    let df = to.file() - from.file();
    let dr = to.rank() - from.rank();

    if (df, dr) == (0, 0) || (df != 0 && dr != 0 && df.abs() != dr.abs()) {
        return false;
    }

    let distance = df.abs().max(dr.abs()) as u8;
    let rules = unit.role().rules(unit.is_heroic());
    if distance > rules.capture.max() && unit.role() != Role::Commander {
        return false;
    }

    let mut hit = false;
    ray(view, from, unit, (df.signum(), dr.signum()), defense, |r| {
        hit |= matches!(r, Reach::Strike { to: t, .. } if t == to);
    });

    hit
}

/// Whether any unit of a [`Color`] may attack `sq`.
///
/// Carried units attack from their carrier's square.
pub fn attacked(view: &Effective<'_>, sq: Square, by: Color) -> bool {
    let none = AirDefense::default();
    let mut defense = None;

    for (from, p) in view.pieces(by) {
        for unit in p.units() {
            let zones = match unit.role().mobility() {
                Mobility::Air => &*defense.get_or_insert_with(|| AirDefense::of(view, !by)),
                _ => &none,
            };

            if strikes(view, from, &unit, sq, zones) {
                return true;
            }
        }
    }

    false
}

/// Whether the commander of a [`Color`] faces the enemy commander with nothing in between.
pub fn exposed(view: &Effective<'_>, c: Color) -> bool {
    let (ours, theirs) = match (view.commander(c), view.commander(!c)) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };

    let df = theirs.file() - ours.file();
    let dr = theirs.rank() - ours.rank();
    if df != 0 && dr != 0 {
        return false;
    }

    let mut sq = ours;
    while let Some(next) = sq.offset(df.signum(), dr.signum()) {
        if next == theirs {
            return true;
        } else if view.get(next).is_some() {
            return false;
        }

        sq = next;
    }

    false
}

/// Whether the commander of a [`Color`] is attacked or exposed.
pub fn in_check(view: &Effective<'_>, c: Color) -> bool {
    match view.commander(c) {
        None => false,
        Some(sq) => exposed(view, c) || attacked(view, sq, !c),
    }
}

fn stack_moves(
    view: &Effective<'_>,
    from: Square,
    piece: &Piece,
    defense: &AirDefense,
    moves: &mut Vec<Move>,
) {
    for r in reach(view, from, piece, defense) {
        let piece = piece.clone();
        match r {
            Reach::Move(to) => moves.push(Move::Normal { from, to, piece }),

            Reach::Join(to) => {
                if let Some(with) = view.get(to) {
                    let with = with.clone();
                    moves.push(Move::Combine {
                        from,
                        to,
                        piece,
                        with,
                    });
                }
            }

            Reach::Strike {
                to,
                capture,
                stay,
                suicide,
            } => {
                let captured = match view.get(to) {
                    Some(p) => p.clone(),
                    None => continue,
                };

                if capture {
                    moves.push(Move::Capture {
                        from,
                        to,
                        piece: piece.clone(),
                        captured: captured.clone(),
                    });
                }

                if stay {
                    moves.push(Move::StayCapture {
                        from,
                        to,
                        piece: piece.clone(),
                        captured: captured.clone(),
                    });
                }

                if suicide {
                    moves.push(Move::SuicideCapture {
                        from,
                        to,
                        piece,
                        captured,
                    });
                }
            }
        }
    }
}

fn deploy_steps(
    view: &Effective<'_>,
    from: Square,
    unit: &Piece,
    session: Option<&DeploySession>,
    defense: &AirDefense,
    moves: &mut Vec<Move>,
) {
    for r in reach(view, from, unit, defense) {
        let mut step = |to: Square, landing: Landing| {
            moves.push(Move::Deploy(DeployStep {
                from,
                to,
                piece: unit.clone(),
                landing,
            }))
        };

        match r {
            Reach::Move(to) => step(to, Landing::Vacant),

            Reach::Join(to) => {
                if session.map_or(false, |s| s.is_deployed(to)) {
                    if let Some(with) = view.get(to) {
                        step(to, Landing::Recombine(with.clone()));
                    }
                }
            }

            Reach::Strike {
                to,
                capture,
                stay,
                suicide,
            } => {
                if let Some(captured) = view.get(to) {
                    if capture {
                        step(to, Landing::Capture(captured.clone()));
                    }

                    if stay {
                        step(to, Landing::StayCapture(captured.clone()));
                    }

                    if suicide {
                        step(to, Landing::SuicideCapture(captured.clone()));
                    }
                }
            }
        }
    }
}

/// Every move of a [`Color`], regardless of its commander's safety.
///
/// While a deploy is active, only the units it has yet to account for may move.
pub fn pseudo_moves(view: &Effective<'_>, turn: Color, session: Option<&DeploySession>) -> Vec<Move> {
    let defense = AirDefense::of(view, !turn);
    let mut moves = Vec::new();

    match session {
        Some(s) => {
            if view.get(s.origin()).is_some() {
                for unit in s.remaining() {
                    deploy_steps(view, s.origin(), &unit, Some(s), &defense, &mut moves);
                }
            }
        }

        None => {
            for (from, p) in view.pieces(turn) {
                stack_moves(view, from, p, &defense, &mut moves);
                if p.is_stack() {
                    for unit in p.units() {
                        deploy_steps(view, from, &unit, None, &defense, &mut moves);
                    }
                }
            }
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Board, MoveKind};
    use test_strategy::proptest;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn board(pieces: &[(&str, &str)]) -> Board {
        let mut board = Board::default();
        for (s, p) in pieces {
            board.set(sq(s), Some(p.parse().unwrap()));
        }

        board
    }

    fn reached(board: &Board, from: &str) -> Vec<Reach> {
        let view = Effective::new(board, None);
        let p = view.get(sq(from)).unwrap();
        let defense = AirDefense::of(&view, !p.color());
        reach(&view, sq(from), p, &defense)
    }

    fn moves_to(reached: &[Reach]) -> Vec<Square> {
        let mut squares: Vec<_> = reached
            .iter()
            .filter_map(|r| match r {
                Reach::Move(to) => Some(*to),
                _ => None,
            })
            .collect();

        squares.sort();
        squares
    }

    #[test]
    fn infantry_steps_orthogonally() {
        let b = board(&[("e4", "I")]);
        let mut expected = vec![sq("e5"), sq("f4"), sq("e3"), sq("d4")];
        expected.sort();
        assert_eq!(moves_to(&reached(&b, "e4")), expected);
    }

    #[test]
    fn navy_never_moves_onto_land() {
        let b = board(&[("c5", "N")]);
        let squares = moves_to(&reached(&b, "c5"));
        assert!(!squares.is_empty());
        assert!(squares.iter().all(|s| !s.is_land()));
    }

    #[test]
    fn navy_stranded_inland_has_no_moves() {
        let b = board(&[("g4", "N")]);
        assert_eq!(moves_to(&reached(&b, "g4")), vec![]);
    }

    #[proptest]
    fn land_pieces_never_move_onto_water(#[filter(!#sq.is_water())] sq: Square) {
        let mut b = Board::default();
        b.set(sq, Some(Piece::new(Color::Red, Role::Militia)));
        let view = Effective::new(&b, None);
        let p = view.get(sq).unwrap();
        for r in reach(&view, sq, p, &AirDefense::default()) {
            if let Reach::Move(to) = r {
                assert!(!to.is_water());
            }
        }
    }

    #[test]
    fn tank_shoots_over_a_single_piece() {
        let b = board(&[("e4", "T"), ("e5", "i"), ("e6", "m"), ("f4", "I"), ("g4", "i")]);
        let r = reached(&b, "e4");
        let strike = |to: &str| {
            r.iter()
                .any(|r| matches!(r, Reach::Strike { to: t, capture: true, .. } if *t == sq(to)))
        };

        assert!(strike("e5"));
        assert!(strike("e6"));
        assert!(strike("g4"));
        assert!(!moves_to(&r).contains(&sq("e6")));
    }

    #[test]
    fn artillery_ignores_blocking() {
        let b = board(&[("g2", "A"), ("g3", "I"), ("g4", "i")]);
        let r = reached(&b, "g2");
        assert!(moves_to(&r).contains(&sq("g5")));
        assert!(r.contains(&Reach::Strike {
            to: sq("g4"),
            capture: true,
            stay: false,
            suicide: false,
        }));
    }

    #[test]
    fn heavy_pieces_cross_the_river_over_bridges_only() {
        let artillery: Piece = "A".parse().unwrap();
        assert!(can_stand(&artillery, sq("f5"), sq("f7")));
        assert!(!can_stand(&artillery, sq("g5"), sq("g7")));
        assert!(!can_stand(&artillery, sq("f5"), sq("g7")));
        assert!(can_stand(&artillery, sq("g3"), sq("g5")));

        let b = board(&[("g5", "A"), ("g7", "i")]);
        assert!(reached(&b, "g5").contains(&Reach::Strike {
            to: sq("g7"),
            capture: false,
            stay: true,
            suicide: false,
        }));
    }

    #[test]
    fn engineer_carries_heavy_pieces_across_the_river() {
        let stack: Piece = "(EA)".parse().unwrap();
        assert!(can_stand(&stack, sq("g6"), sq("g7")));
    }

    #[test]
    fn navy_captures_land_pieces_from_the_water() {
        let b = board(&[("b4", "N"), ("d4", "i"), ("c5", "n")]);
        let r = reached(&b, "b4");

        assert!(r.contains(&Reach::Strike {
            to: sq("d4"),
            capture: false,
            stay: true,
            suicide: false,
        }));

        assert!(r.contains(&Reach::Strike {
            to: sq("c5"),
            capture: true,
            stay: false,
            suicide: false,
        }));
    }

    #[test]
    fn air_force_dives_into_a_single_zone() {
        let b = board(&[("f3", "F"), ("f8", "g"), ("f7", "i")]);
        let r = reached(&b, "f3");

        assert!(moves_to(&r).contains(&sq("f6")));
        assert!(!moves_to(&r).contains(&sq("f9")));
        assert!(r.contains(&Reach::Strike {
            to: sq("f7"),
            capture: false,
            stay: false,
            suicide: true,
        }));

        assert!(r.contains(&Reach::Strike {
            to: sq("f8"),
            capture: false,
            stay: false,
            suicide: true,
        }));

        assert!(!r.iter().any(|r| matches!(r, Reach::Move(to) | Reach::Join(to) if *to == sq("f10"))));
    }

    #[test]
    fn air_force_is_grounded_by_overlapping_zones() {
        let b = board(&[("f3", "F"), ("f6", "g"), ("g6", "s")]);
        let r = reached(&b, "f3");
        assert!(!r.iter().any(|r| matches!(r, Reach::Strike { to, .. } if *to == sq("f6"))));
    }

    #[test]
    fn air_force_may_capture_or_stay_outside_zones() {
        let b = board(&[("f3", "F"), ("f9", "i")]);
        assert!(reached(&b, "f3").contains(&Reach::Strike {
            to: sq("f9"),
            capture: true,
            stay: true,
            suicide: false,
        }));
    }

    #[test]
    fn air_force_may_sacrifice_itself_against_the_commander() {
        let b = board(&[("f3", "F"), ("f8", "c")]);
        assert!(reached(&b, "f3").contains(&Reach::Strike {
            to: sq("f8"),
            capture: true,
            stay: true,
            suicide: true,
        }));

        let b = board(&[("g2", "F"), ("g12", "c"), ("a1", "C")]);
        let view = Effective::new(&b, None);
        let moves = pseudo_moves(&view, Color::Red, None);
        assert!(moves.iter().any(|m| m.kind() == MoveKind::SUICIDE_CAPTURE && m.to() == sq("g12")));
    }

    #[test]
    fn commanders_fly_over_open_lines() {
        let b = board(&[("f1", "C"), ("f12", "c")]);
        let view = Effective::new(&b, None);
        assert!(exposed(&view, Color::Red));
        assert!(attacked(&view, sq("f12"), Color::Red));

        let b = board(&[("f1", "C"), ("f6", "I"), ("f12", "c")]);
        let view = Effective::new(&b, None);
        assert!(!exposed(&view, Color::Red));
        assert!(!attacked(&view, sq("f12"), Color::Red));
    }

    #[test]
    fn carried_units_attack_from_their_carrier() {
        let b = board(&[("e4", "(EA)"), ("e7", "c")]);
        let view = Effective::new(&b, None);
        assert!(attacked(&view, sq("e7"), Color::Red));
        assert!(in_check(&view, Color::Blue));
    }

    #[test]
    fn stacks_deploy_each_unit_separately() {
        let b = board(&[("c3", "(TI)")]);
        let view = Effective::new(&b, None);
        let moves = pseudo_moves(&view, Color::Red, None);

        assert!(moves.iter().any(|m| matches!(m, Move::Normal { .. })));
        for role in [Role::Tank, Role::Infantry] {
            assert!(moves.iter().any(
                |m| matches!(m, Move::Deploy(DeployStep { piece, .. }) if piece.role() == role)
            ));
        }
    }

    #[test]
    fn active_deploy_only_moves_remaining_units() {
        let b = board(&[("c3", "(TI)"), ("e5", "M")]);
        let mut session = DeploySession::new(sq("c3"), Color::Red, "(TI)".parse().unwrap());
        session.record(Piece::new(Color::Red, Role::Tank));

        let view = Effective::new(&b, None);
        let moves = pseudo_moves(&view, Color::Red, Some(&session));
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| matches!(
            m,
            Move::Deploy(DeployStep { piece, from, .. }) if piece.role() == Role::Infantry && *from == sq("c3")
        )));
    }

    #[test]
    fn pieces_join_compatible_friends_only() {
        let b = board(&[("e4", "I"), ("e5", "T"), ("d4", "M")]);
        let r = reached(&b, "e4");
        assert!(r.contains(&Reach::Join(sq("e5"))));
        assert!(!r.contains(&Reach::Join(sq("d4"))));
    }
}

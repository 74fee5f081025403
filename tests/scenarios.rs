use anyhow::Error as Anyhow;
use lib::chess::*;
use proptest::{collection::vec, prelude::*, sample::Selector};
use test_strategy::proptest;

const DEPLOYING: &str = "7c3/11/11/11/11/11/11/11/11/2(TI)8/11/6C4 r - - 0 1";

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn piece(s: &str) -> Piece {
    s.parse().unwrap()
}

#[test]
fn deploying_a_stack_one_piece_at_a_time() -> Result<(), Anyhow> {
    let mut game: Game = DEPLOYING.parse()?;

    game.submit("Tc3>c4")?;
    assert_eq!(game.turn(), Color::Red);
    assert_eq!(game.piece_at(sq("c4")), Some(&piece("T")));
    assert_eq!(game.piece_at(sq("c3")), Some(&piece("I")));

    game.submit("Ic3>d3")?;
    assert_eq!(game.turn(), Color::Blue);
    assert_eq!(game.session(), None);
    assert_eq!(game.piece_at(sq("c4")), Some(&piece("T")));
    assert_eq!(game.piece_at(sq("d3")), Some(&piece("I")));
    assert_eq!(game.piece_at(sq("c3")), None);

    assert!(matches!(
        game.history().last().map(HistoryEntry::mv),
        Some(Move::DeployComplete { steps, .. }) if steps.len() == 2
    ));

    game.undo();
    game.undo();
    assert_eq!(game.turn(), Color::Red);
    assert_eq!(game.session(), None);
    assert_eq!(game.piece_at(sq("c3")), Some(&piece("(TI)")));
    assert_eq!(game.to_string(), DEPLOYING);

    Ok(())
}

#[test]
fn active_deploy_never_touches_the_real_board() -> Result<(), Anyhow> {
    let mut game: Game = DEPLOYING.parse()?;
    let board = game.board().clone();

    game.submit("Tc3>c4")?;
    assert_eq!(game.board(), &board);
    assert_eq!(game.board().get(sq("c4")), None);
    assert_eq!(game.piece_at(sq("c4")), Some(&piece("T")));

    game.rollback()?;
    assert_eq!(game.board(), &board);
    assert_eq!(game.session(), None);
    assert!(game.history().is_empty());
    assert_eq!(game.to_string(), DEPLOYING);

    Ok(())
}

#[test]
fn only_the_deploying_stack_may_move_during_a_deploy() -> Result<(), Anyhow> {
    let mut game: Game = DEPLOYING.parse()?;
    game.submit("Tc3>c4")?;

    assert!(game.moves(MoveKind::all()).iter().all(|m| m.from() == sq("c3")));
    assert!(game.moves(MoveKind::all()).iter().all(Move::is_deploy_step));
    let req = DeployRequest {
        from: sq("c3"),
        moves: vec![DeployMove { piece: Role::Infantry, to: sq("d3"), capture: None }],
        stay: vec![],
    };

    assert_eq!(game.deploy(&req), Err(MoveError::DeployInProgress));

    Ok(())
}

#[test]
fn navy_never_reaches_land() -> Result<(), Anyhow> {
    let mut game: Game = "7c3/11/11/11/11/11/11/1N9/11/11/11/6C4 r - - 0 1".parse()?;

    let moves = game.moves_from("b5");
    assert!(!moves.is_empty());
    assert!(moves.iter().all(|m| !m.to().is_land()));

    assert_eq!(game.submit("Nb5-d5"), Err(MoveError::NoMatchingLegalMove));
    assert!(game.submit("Nb5-c5").is_ok());

    Ok(())
}

#[test]
fn pieces_that_cannot_stand_on_the_target_stay_capture() -> Result<(), Anyhow> {
    let mut game: Game = "7c3/11/11/11/11/11/11/1i1A7/11/11/11/6C4 r - - 0 1".parse()?;

    assert_eq!(game.submit("Ad5xb5"), Err(MoveError::NoMatchingLegalMove));
    assert_eq!(game.submit("Ad5xf5"), Err(MoveError::CaptureTargetInvalid));

    let m = game.submit("Ad5_b5")?;
    assert!(matches!(m, Move::StayCapture { .. }));
    assert_eq!(game.piece_at(sq("b5")), None);
    assert_eq!(game.piece_at(sq("d5")), Some(&piece("A")));
    assert_eq!(game.clock().halfmoves(), 0);

    Ok(())
}

#[test]
fn deploy_request_commits_or_changes_nothing() -> Result<(), Anyhow> {
    let mut game: Game = DEPLOYING.parse()?;

    let partial = DeployRequest {
        from: sq("c3"),
        moves: vec![DeployMove { piece: Role::Tank, to: sq("c4"), capture: None }],
        stay: vec![],
    };

    assert_eq!(game.deploy(&partial), Err(MoveError::DeployAccounting));
    assert_eq!(game.to_string(), DEPLOYING);

    let unreachable = DeployRequest {
        moves: vec![
            DeployMove { piece: Role::Tank, to: sq("c4"), capture: None },
            DeployMove { piece: Role::Infantry, to: sq("k12"), capture: None },
        ],
        ..partial.clone()
    };

    assert_eq!(game.deploy(&unreachable), Err(MoveError::NoMatchingLegalMove));
    assert_eq!(game.to_string(), DEPLOYING);
    assert_eq!(game.session(), None);
    assert!(game.history().is_empty());

    let complete = DeployRequest {
        stay: vec![Role::Infantry],
        ..partial
    };

    let m = game.deploy(&complete)?;
    assert!(matches!(m, Move::DeployComplete { .. }));
    assert_eq!(game.turn(), Color::Blue);
    assert_eq!(game.piece_at(sq("c3")), Some(&piece("I")));
    assert_eq!(game.piece_at(sq("c4")), Some(&piece("T")));

    Ok(())
}

#[test]
fn deploy_request_can_be_given_as_ron() -> Result<(), Anyhow> {
    let mut game: Game = DEPLOYING.parse()?;
    let req: DeployRequest = ron::from_str(
        r#"(from: "c3", moves: [(piece: Tank, to: "c4"), (piece: Infantry, to: "d3")])"#,
    )?;

    game.submit(req)?;
    assert_eq!(game.turn(), Color::Blue);
    assert_eq!(game.piece_at(sq("c3")), None);

    Ok(())
}

#[test]
fn stranding_pieces_on_water_rejects_the_commit() -> Result<(), Anyhow> {
    let mut game: Game = "7c3/11/11/11/11/11/11/(NT)10/11/11/11/6C4 r - - 0 1".parse()?;

    game.submit("Na5>a6")?;
    assert_eq!(
        game.stay(&[Role::Tank]),
        Err(MoveError::StackComposition(StackCompositionError::Stranded(sq("a5"))))
    );

    let session = game.session().unwrap();
    assert!(!session.is_complete());
    assert_eq!(session.remaining(), vec![piece("T")]);

    game.rollback()?;
    assert_eq!(game.piece_at(sq("a5")), Some(&piece("(NT)")));

    Ok(())
}

#[test]
fn stay_requires_unaccounted_pieces() -> Result<(), Anyhow> {
    let mut game: Game = DEPLOYING.parse()?;
    game.submit("Tc3>c4")?;

    assert_eq!(game.stay(&[Role::Tank]), Err(MoveError::DeployAccounting));
    assert_eq!(game.stay(&[Role::Navy]), Err(MoveError::DeployAccounting));
    assert_eq!(game.commit(), Err(MoveError::DeployAccounting));

    game.stay(&[Role::Infantry])?;
    assert_eq!(game.session(), None);
    assert_eq!(game.turn(), Color::Blue);

    Ok(())
}

#[proptest(cases = 16)]
fn undoing_every_move_restores_the_starting_position(
    #[strategy(vec(any::<Selector>(), 1..12))] selectors: Vec<Selector>,
) {
    let mut game = Game::default();

    for selector in selectors {
        match selector.try_select(game.moves(MoveKind::all())) {
            None => break,
            Some(m) => game.play(&m)?,
        }
    }

    while game.undo().is_some() {}

    assert_eq!(game, Game::default());
}

#[test]
fn pieces_on_the_east_end_of_the_top_rank_move_and_take_back() -> Result<(), Anyhow> {
    for (square, rank) in [("h12", "4c2{}3"), ("i12", "4c3{}2"), ("j12", "4c4{}1"), ("k12", "4c5{}")] {
        for letter in ["i", "t", "m", "e", "a", "g", "s", "f"] {
            let rank = rank.replace("{}", letter);
            let position = format!("{rank}/11/11/11/11/11/11/11/11/11/11/5C5 b - - 0 1");
            let mut game: Game = position.parse()?;
            assert_eq!(game.piece_at(sq(square)), Some(&piece(letter)), "{position}");
            assert!(!game.moves_from(square).is_empty(), "{position}");

            for m in game.moves(MoveKind::all()) {
                let before = game.clone();
                game.play(&m)?;
                assert!(game.outcome().is_none() || m.captured().is_some(), "{position} {m}");
                game.undo();
                assert_eq!(game, before, "{position} {m}");
            }
        }
    }

    Ok(())
}

#[test]
fn resumed_deploy_plays_out_like_the_live_one() -> Result<(), Anyhow> {
    let mut live: Game = DEPLOYING.parse()?;
    live.submit("Tc3>c4")?;

    let resumed: Game = live.to_string().parse()?;
    assert_eq!(resumed.board(), live.board());
    assert_eq!(resumed.session(), live.session());

    let moves = live.moves(MoveKind::all());
    assert_eq!(resumed.moves(MoveKind::all()), moves);

    for m in moves {
        let (mut a, mut b) = (live.clone(), resumed.clone());
        a.play(&m)?;
        b.play(&m)?;
        assert_eq!(a.to_string(), b.to_string(), "{m}");
    }

    let (mut a, mut b) = (live.clone(), resumed);
    a.rollback()?;
    b.rollback()?;
    assert_eq!(a.board(), b.board());
    assert_eq!(b.to_string(), DEPLOYING);

    Ok(())
}

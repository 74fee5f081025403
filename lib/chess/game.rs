use crate::chess::{movegen, Action, AirDefense, Board, Clock, Color, Command, Context};
use crate::chess::{DeployRequest, DeploySession, DeployStep, Effective, HistoryEntry, Input};
use crate::chess::{Landing, Move, MoveError, MoveKind, MoveRequest, Outcome, Piece, Role};
use crate::chess::{San, Square, StackCompositionError};
use crate::util::Integer;
use tracing::{debug, instrument, warn};

/// The state of a game and the rules engine that drives it.
///
/// Every change goes through reversible [`Command`]s recorded in the history, so
/// any move can be taken back exactly.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Game {
    board: Board,
    clock: Clock,
    session: Option<DeploySession>,
    history: Vec<HistoryEntry>,
    testing: bool,
}

impl Default for Game {
    fn default() -> Self {
        Game::STARTING
            .parse()
            .unwrap_or_else(|e| unreachable!("invalid starting position: {e}"))
    }
}

impl Context for Game {
    fn get(&self, sq: Square) -> Option<&Piece> {
        self.piece_at(sq)
    }

    fn put(&mut self, sq: Square, p: Option<Piece>) {
        for c in Color::iter() {
            let commands = p.as_ref().map_or(false, |p| {
                p.color() == c && p.contains(Role::Commander)
            });

            if commands {
                self.clock = self.clock.clone().with_commander(c, Some(sq));
            } else if self.clock.commander(c) == Some(sq) {
                self.clock = self.clock.clone().with_commander(c, None);
            }
        }

        match &mut self.session {
            Some(s) => s.write(&self.board, sq, p),
            None => {
                self.board.set(sq, p);
            }
        }
    }

    fn session_mut(&mut self) -> Option<&mut DeploySession> {
        self.session.as_mut()
    }
}

impl Game {
    /// The standard starting position.
    pub const STARTING: &'static str =
        "6c4/1n2fh1hf2/3a2s2a1/2n1gt1tg2/2ie2m3i/11/11/2IE2M3I/2NGT1TG3/3A2S2A1/1N2FH1HF2/6C4 r - - 0 1";

    /// Assembles a game out of a board, a clock and possibly a deploy in progress.
    ///
    /// The commanders tracked by the clock are taken from the board.
    pub fn new(board: Board, clock: Clock, session: Option<DeploySession>) -> Self {
        let view = Effective::new(&board, session.as_ref().map(|s| s.overlay()));
        let clock = Color::iter().fold(clock, |clock, c| {
            let sq = view.commander(c);
            clock.with_commander(c, sq)
        });

        Game {
            board,
            clock,
            session,
            history: Vec::new(),
            testing: false,
        }
    }

    /// The side to move.
    #[inline(always)]
    pub fn turn(&self) -> Color {
        self.clock.turn()
    }

    /// The scalar state of the game.
    #[inline(always)]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The real board, without the changes of an active deploy.
    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board as the players see it, with any active deploy.
    #[inline(always)]
    pub fn view(&self) -> Effective<'_> {
        Effective::new(&self.board, self.session.as_ref().map(|s| s.overlay()))
    }

    /// The [`Piece`] on a [`Square`], as the players see it.
    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.view().get(sq)
    }

    /// The square of the commander of a [`Color`], if still on the board.
    #[inline(always)]
    pub fn commander(&self, c: Color) -> Option<Square> {
        self.clock.commander(c)
    }

    /// The deploy in progress, if any.
    #[inline(always)]
    pub fn session(&self) -> Option<&DeploySession> {
        self.session.as_ref()
    }

    /// The moves played so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Whether the commander of the side to move is attacked or exposed.
    pub fn is_check(&self) -> bool {
        movegen::in_check(&self.view(), self.turn())
    }

    /// Whether the deploy in progress accounts for every unit of its stack.
    pub fn is_deploy_complete(&self) -> bool {
        self.session.as_ref().map_or(false, DeploySession::is_complete)
    }

    /// The outcome of the game, if it is over.
    ///
    /// A game with a deploy in progress is never over, the deploy may still be rolled back.
    pub fn outcome(&self) -> Option<Outcome> {
        for c in Color::iter() {
            if self.commander(c).is_none() {
                return Some(Outcome::CommanderCaptured(!c));
            }
        }

        if self.session.is_some() || !self.moves(MoveKind::all()).is_empty() {
            None
        } else if self.is_check() {
            Some(Outcome::Checkmate(!self.turn()))
        } else {
            Some(Outcome::Stalemate)
        }
    }

    /// Moves of the side to move, regardless of its commander's safety.
    pub fn pseudo_moves(&self) -> Vec<Move> {
        movegen::pseudo_moves(&self.view(), self.turn(), self.session.as_ref())
    }

    /// The legal moves of the side to move, of any of the given kinds.
    pub fn moves(&self, kind: MoveKind) -> Vec<Move> {
        let mut sandbox = self.sandbox();
        self.pseudo_moves()
            .into_iter()
            .filter(|m| kind.intersects(m.kind()))
            .filter(|m| sandbox.is_legal(m))
            .collect()
    }

    /// The legal moves starting from a square.
    ///
    /// A malformed square simply has no moves.
    pub fn moves_from(&self, sq: &str) -> Vec<Move> {
        match sq.parse::<Square>() {
            Err(_) => Vec::new(),
            Ok(sq) => {
                let mut moves = self.moves(MoveKind::all());
                moves.retain(|m| m.from() == sq);
                moves
            }
        }
    }

    /// Runs `f` on the game as it would be after `m`, then takes `m` back.
    ///
    /// The move runs in testing mode, which never begins nor commits a deploy.
    pub fn preview<R, F: FnOnce(&Game) -> R>(&mut self, m: &Move, f: F) -> Result<R, MoveError> {
        let testing = std::mem::replace(&mut self.testing, true);
        let result = self.perform(m).map(|()| {
            let r = f(self);
            self.undo_entry();
            r
        });

        self.testing = testing;
        result
    }

    /// The notation of `m`, marked if it leaves the enemy commander attacked.
    pub fn san(&self, m: &Move) -> Result<San, MoveError> {
        let turn = self.turn();
        let check = self.sandbox().preview(m, |g| match g.commander(!turn) {
            None => false,
            Some(sq) => movegen::attacked(&g.view(), sq, turn),
        })?;

        Ok(San(m.clone(), check))
    }

    /// Finds the single legal move a request refers to.
    pub fn resolve(&self, req: &MoveRequest) -> Result<Move, MoveError> {
        let target = self.piece_at(req.to);
        if req.wants_capture() && !target.map_or(false, |p| p.color() != self.turn()) {
            return Err(MoveError::CaptureTargetInvalid);
        }

        let mut candidates = self.pseudo_moves();
        candidates.retain(|m| req.matches(m));

        if req.deploy.is_none()
            && self.session.is_none()
            && candidates.iter().any(|m| !m.is_deploy_step())
        {
            candidates.retain(|m| !m.is_deploy_step());
        }

        if candidates.iter().any(|m| m.kind().contains(MoveKind::CAPTURE)) {
            if req.stay.is_none() {
                candidates.retain(|m| !m.kind().contains(MoveKind::STAY_CAPTURE));
            }

            if req.suicide.is_none() {
                candidates.retain(|m| !m.kind().contains(MoveKind::SUICIDE_CAPTURE));
            }
        }

        if candidates.is_empty() {
            if req.combine == Some(true) {
                self.composition(req)?;
            }

            return Err(MoveError::NoMatchingLegalMove);
        }

        let mut sandbox = self.sandbox();
        candidates.retain(|m| sandbox.is_legal(m));

        match candidates.len() {
            0 => Err(MoveError::IllegalMove),
            1 => Ok(candidates.remove(0)),
            _ => Err(MoveError::AmbiguousMove),
        }
    }

    fn composition(&self, req: &MoveRequest) -> Result<(), MoveError> {
        let turn = self.turn();
        let (mover, with) = match (self.piece_at(req.from), self.piece_at(req.to)) {
            (Some(m), Some(w)) if m.color() == turn && w.color() == turn => (m, w),
            _ => return Ok(()),
        };

        let mover = match req.piece {
            Some(r) if mover.role() != r => mover.unit(r),
            _ => Some(mover.clone()),
        };

        match mover {
            None => Ok(()),
            Some(m) => Piece::stack([with.clone(), m]).map(drop).map_err(MoveError::from),
        }
    }

    /// Plays a move submitted in any of the accepted shapes.
    #[instrument(level = "trace", skip(self, input), err)]
    pub fn submit<I: Into<Input>>(&mut self, input: I) -> Result<Move, MoveError> {
        let req = match input.into() {
            Input::Deploy(req) => return self.deploy(&req),
            Input::Request(req) => req,
            Input::Notation(s) => s.parse()?,
        };

        let m = self.resolve(&req)?;
        self.apply(&m)?;
        Ok(m)
    }

    /// Plays a legal [`Move`].
    ///
    /// A deploy step that accounts for the last unit of its stack commits the
    /// deploy, if the commit fails the step is taken back.
    #[instrument(level = "trace", skip(self), err)]
    pub fn play(&mut self, m: &Move) -> Result<(), MoveError> {
        if let Move::DeployComplete { steps, stay, .. } = m {
            return self.replay(steps, stay);
        }

        if !self.pseudo_moves().contains(m) {
            return Err(MoveError::NoMatchingLegalMove);
        } else if !self.sandbox().is_legal(m) {
            return Err(MoveError::IllegalMove);
        }

        self.apply(m)
    }

    /// Deploys a whole stack at once.
    ///
    /// Either every unit is accounted for and the deploy commits, or nothing changes.
    #[instrument(level = "trace", skip(self), err)]
    pub fn deploy(&mut self, req: &DeployRequest) -> Result<Move, MoveError> {
        if self.session.is_some() {
            return Err(MoveError::DeployInProgress);
        }

        let stack = match self.piece_at(req.from) {
            Some(p) if p.color() == self.turn() => p,
            _ => return Err(MoveError::NoMatchingLegalMove),
        };

        let mut expected: Vec<Role> = stack.roles().collect();
        let mut requested: Vec<Role> = req.roles().collect();
        expected.sort();
        requested.sort();

        if req.moves.is_empty() || expected != requested {
            return Err(MoveError::DeployAccounting);
        }

        let result = self.deploy_each(req);
        if result.is_err() && self.session.is_some() {
            self.rollback()?;
        }

        result?;
        match self.history.last() {
            Some(e) if matches!(e.mv, Move::DeployComplete { .. }) => Ok(e.mv.clone()),
            _ => Err(MoveError::DeployAccounting),
        }
    }

    /// Marks still unaccounted units of the deploy in progress as staying.
    ///
    /// Once every unit is accounted for the deploy commits. If the commit fails
    /// the units are unmarked again.
    #[instrument(level = "trace", skip(self), err)]
    pub fn stay(&mut self, roles: &[Role]) -> Result<(), MoveError> {
        let session = self.session.as_mut().ok_or(MoveError::NoActiveDeploy)?;
        let remaining = session.remaining();

        let mut units: Vec<Piece> = Vec::new();
        for &r in roles {
            match remaining.iter().find(|p| p.role() == r) {
                Some(p) if !units.iter().any(|u| u.role() == r) => units.push(p.clone()),
                _ => return Err(MoveError::DeployAccounting),
            }
        }

        for u in &units {
            session.add_stay(u.clone());
        }

        if session.is_complete() {
            if let Err(e) = self.seal(false) {
                if let Some(s) = self.session.as_mut() {
                    for u in &units {
                        s.remove_stay(u.role());
                    }
                }

                return Err(e);
            }
        }

        Ok(())
    }

    /// Commits the deploy in progress.
    ///
    /// The staged changes reach the real board and the turn passes. A failed
    /// commit leaves the deploy active.
    #[instrument(level = "trace", skip(self), err)]
    pub fn commit(&mut self) -> Result<(), MoveError> {
        self.seal(false)
    }

    /// Discards the deploy in progress.
    #[instrument(level = "trace", skip(self), err)]
    pub fn rollback(&mut self) -> Result<(), MoveError> {
        if self.session.is_none() {
            return Err(MoveError::NoActiveDeploy);
        }

        while self.history.last().map_or(false, HistoryEntry::is_step) {
            self.undo_entry();
        }

        self.session = None;
        debug!("deploy rolled back");
        Ok(())
    }

    /// Takes back the last move, returning it.
    #[instrument(level = "trace", skip(self))]
    pub fn undo(&mut self) -> Option<Move> {
        self.undo_entry().map(|e| e.mv)
    }

    fn sandbox(&self) -> Game {
        Game {
            board: self.board.clone(),
            clock: self.clock.clone(),
            session: self.session.clone(),
            history: Vec::new(),
            testing: true,
        }
    }

    fn is_legal(&mut self, m: &Move) -> bool {
        let turn = self.turn();
        let legal = self.preview(m, |g| {
            !movegen::in_check(&g.view(), turn) && (!g.is_deploy_complete() || g.check_stay().is_ok())
        });

        legal.unwrap_or(false)
    }

    fn command(&self, m: &Move) -> Result<Command, MoveError> {
        use Action as A;

        let actions = match m {
            Move::Normal { from, to, piece } => vec![A::remove(*from), A::place(*to, piece.clone())],

            Move::Capture { from, to, piece, .. } => vec![
                A::remove(*from),
                A::remove(*to),
                A::place(*to, piece.clone()),
            ],

            Move::StayCapture { to, .. } => vec![A::remove(*to)],

            Move::SuicideCapture { from, to, .. } => vec![A::remove(*from), A::remove(*to)],

            Move::Combine {
                from,
                to,
                piece,
                with,
            } => {
                let joined = Piece::stack([with.clone(), piece.clone()])?;
                vec![A::remove(*from), A::place(*to, joined)]
            }

            Move::Deploy(DeployStep {
                from,
                to,
                piece,
                landing,
            }) => {
                let (from, to, role) = (*from, *to, piece.role());
                match landing {
                    Landing::Vacant => vec![
                        A::detach(from, role),
                        A::place(to, piece.clone()),
                        A::record(piece.clone()),
                    ],

                    Landing::Capture(_) => vec![
                        A::detach(from, role),
                        A::remove(to),
                        A::place(to, piece.clone()),
                        A::record(piece.clone()),
                    ],

                    Landing::StayCapture(_) => vec![A::remove(to), A::record(piece.clone())],

                    Landing::SuicideCapture(_) => vec![
                        A::detach(from, role),
                        A::remove(to),
                        A::record(piece.clone()),
                    ],

                    Landing::Recombine(with) => {
                        let joined = Piece::stack([with.clone(), piece.clone()])?;
                        vec![
                            A::detach(from, role),
                            A::place(to, joined),
                            A::record(piece.clone()),
                        ]
                    }
                }
            }

            Move::DeployComplete { .. } => return Err(MoveError::NoMatchingLegalMove),
        };

        Ok(Command::new(actions))
    }

    fn perform(&mut self, m: &Move) -> Result<(), MoveError> {
        let mut command = self.command(m)?;
        let clock = self.clock.clone();
        let session = self.session.clone();

        if m.is_deploy_step() && self.session.is_none() && !self.testing {
            let stack = self.piece_at(m.from()).cloned().ok_or(MoveError::NoMatchingLegalMove)?;
            debug!(origin = %m.from(), stack = %stack, "deploy begins");
            self.session = Some(DeploySession::new(m.from(), self.turn(), stack));
        }

        command.execute(self);

        if !m.is_deploy_step() {
            if !self.testing {
                self.promote(&mut command);
            }

            self.clock = self.clock.clone().advance(m.captured().is_some());
        }

        self.history.push(HistoryEntry {
            mv: m.clone(),
            command,
            clock,
            session,
        });

        Ok(())
    }

    fn apply(&mut self, m: &Move) -> Result<(), MoveError> {
        self.perform(m)?;

        if m.is_deploy_step() {
            debug!(step = %m, "deploy step");
            if self.is_deploy_complete() {
                if let Err(e) = self.seal(true) {
                    self.undo_entry();
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    fn replay(&mut self, steps: &[DeployStep], stay: &[Piece]) -> Result<(), MoveError> {
        if self.session.is_some() {
            return Err(MoveError::DeployInProgress);
        }

        let roles: Vec<Role> = stay.iter().map(Piece::role).collect();
        let result = steps
            .iter()
            .try_for_each(|s| self.play(&Move::Deploy(s.clone())))
            .and_then(|()| match roles.is_empty() {
                true => Ok(()),
                false => self.stay(&roles),
            });

        if result.is_err() && self.session.is_some() {
            self.rollback()?;
        }

        result
    }

    fn deploy_each(&mut self, req: &DeployRequest) -> Result<(), MoveError> {
        for step in req.steps() {
            let m = self.resolve(&step)?;
            self.apply(&m)?;
        }

        if !req.stay.is_empty() {
            self.stay(&req.stay)?;
        }

        Ok(())
    }

    fn check_stay(&self) -> Result<(), MoveError> {
        let origin = match &self.session {
            None => return Ok(()),
            Some(s) => s.origin(),
        };

        if let Some(p) = self.piece_at(origin) {
            let p = Piece::stack(p.units())?;
            if !p.role().mobility().can_stand(origin.terrain()) {
                return Err(StackCompositionError::Stranded(origin).into());
            }
        }

        Ok(())
    }

    /// Commits the active deploy.
    ///
    /// When `absorb` is set, the step that completed the deploy is folded into the
    /// commit, so taking the commit back also takes back that step.
    fn seal(&mut self, absorb: bool) -> Result<(), MoveError> {
        let turn = match &self.session {
            None => return Err(MoveError::NoActiveDeploy),
            Some(s) if !s.is_complete() => return Err(MoveError::DeployAccounting),
            Some(s) => s.turn(),
        };

        if let Err(e) = self.check_stay() {
            warn!(error = %e, "deploy rejected");
            return Err(e);
        } else if movegen::in_check(&self.view(), turn) {
            warn!("deploy rejected, commander left in danger");
            return Err(MoveError::IllegalMove);
        }

        let mut steps: Vec<DeployStep> = self
            .history
            .iter()
            .rev()
            .take_while(|e| e.is_step())
            .filter_map(|e| match &e.mv {
                Move::Deploy(step) => Some(step.clone()),
                _ => None,
            })
            .collect();

        steps.reverse();

        let (clock, pre) = match absorb.then(|| self.history.pop()).flatten() {
            Some(e) => (e.clock, e.session),
            None => (self.clock.clone(), self.session.clone()),
        };

        let session = match self.session.take() {
            Some(s) => s,
            None => return Err(MoveError::NoActiveDeploy),
        };

        let capture = session.overlay().keys().any(|sq| {
            self.board.get(*sq).map_or(false, |p| p.color() != turn)
        });

        let mut command = Command::default();
        for (&sq, p) in session.overlay() {
            let action = match p {
                Some(p) => Action::place(sq, p.clone()),
                None => Action::remove(sq),
            };

            command.then(action, self);
        }

        self.promote(&mut command);

        self.clock = self.clock.clone().advance(capture);

        let mv = Move::DeployComplete {
            from: session.origin(),
            steps,
            stay: session.stay().to_vec(),
        };

        debug!(deploy = %mv, "deploy committed");

        self.history.push(HistoryEntry {
            mv,
            command,
            clock,
            session: pre,
        });

        Ok(())
    }

    fn promote(&mut self, command: &mut Command) {
        let turn = self.turn();
        let target = match self.commander(!turn) {
            None => return,
            Some(sq) => sq,
        };

        let view = self.view();
        let defense = AirDefense::of(&view, !turn);
        let mut promotions = Vec::new();
        for (sq, p) in view.pieces(turn) {
            for unit in p.units() {
                if !unit.is_heroic() && movegen::strikes(&view, sq, &unit, target, &defense) {
                    promotions.push((sq, unit.role()));
                }
            }
        }

        for (sq, role) in promotions {
            debug!(square = %sq, role = %role, "promoted");
            command.then(Action::promote(sq, role), self);
        }
    }

    fn undo_entry(&mut self) -> Option<HistoryEntry> {
        let mut entry = self.history.pop()?;
        self.clock = entry.clock.clone();

        if let Move::DeployComplete { .. } = entry.mv {
            self.session = None;
            entry.command.undo(self);
            self.session = entry.session.clone();
        } else {
            self.session = entry.session.clone();
            entry.command.undo(self);
        }

        self.clock = entry.clock.clone();
        Some(entry)
    }
}

#[cfg(test)]
use proptest::{prelude::*, sample::Selector, sample::SelectorStrategy, strategy::Map};

#[cfg(test)]
impl Arbitrary for Game {
    type Parameters = ();
    type Strategy = Map<(std::ops::Range<usize>, SelectorStrategy), fn((usize, Selector)) -> Game>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0..16usize, any::<Selector>()).prop_map(|(n, selector)| {
            let mut game = Game::default();
            for _ in 0..n {
                match selector.try_select(game.moves(MoveKind::all())) {
                    Some(m) if game.apply(&m).is_ok() => continue,
                    _ => break,
                }
            }

            game
        })
    }
}

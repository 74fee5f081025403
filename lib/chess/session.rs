use crate::chess::{Board, Color, Effective, Piece, Role, Square};
use std::collections::BTreeMap;
use tracing::trace;

/// Changes staged over the real board, `None` meaning an emptied square.
pub type Overlay = BTreeMap<Square, Option<Piece>>;

/// A deploy in progress, splitting the stack on one square across several others.
///
/// Nothing a deploy does reaches the real board until it is committed, every
/// change is staged in the [`Overlay`] instead.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DeploySession {
    origin: Square,
    turn: Color,
    stack: Piece,
    overlay: Overlay,
    moved: Vec<Piece>,
    stay: Vec<Piece>,
}

impl DeploySession {
    /// Begins deploying the stack on `origin`.
    pub fn new(origin: Square, turn: Color, stack: Piece) -> Self {
        DeploySession {
            origin,
            turn,
            stack,
            overlay: Overlay::new(),
            moved: Vec::new(),
            stay: Vec::new(),
        }
    }

    /// Picks up a deploy of the stack on `origin` whose `moved` and `stay`
    /// units are already accounted for.
    ///
    /// The overlay starts empty, the caller stages the changes back with [`DeploySession::write`].
    pub fn restore(
        origin: Square,
        turn: Color,
        stack: Piece,
        moved: Vec<Piece>,
        stay: Vec<Piece>,
    ) -> Self {
        DeploySession {
            moved,
            stay,
            ..DeploySession::new(origin, turn, stack)
        }
    }

    /// The square the deploy started from.
    #[inline(always)]
    pub fn origin(&self) -> Square {
        self.origin
    }

    /// The side deploying.
    #[inline(always)]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The stack as it stood before the deploy started.
    #[inline(always)]
    pub fn stack(&self) -> &Piece {
        &self.stack
    }

    /// The staged changes.
    #[inline(always)]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Units that have already moved.
    #[inline(always)]
    pub fn moved(&self) -> &[Piece] {
        &self.moved
    }

    /// Units marked as staying on the origin.
    #[inline(always)]
    pub fn stay(&self) -> &[Piece] {
        &self.stay
    }

    /// Whether a unit of this [`Role`] has moved or is staying.
    pub fn is_accounted(&self, role: Role) -> bool {
        self.moved.iter().chain(&self.stay).any(|p| p.role() == role)
    }

    /// Units not yet accounted for, in stack order.
    pub fn remaining(&self) -> Vec<Piece> {
        self.stack
            .units()
            .filter(|p| !self.is_accounted(p.role()))
            .collect()
    }

    /// Whether every unit of the stack is accounted for.
    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.moved.len() + self.stay.len() == self.stack.len()
    }

    /// Records a unit as moved.
    pub fn record(&mut self, unit: Piece) {
        debug_assert!(!self.is_accounted(unit.role()));
        trace!(origin = %self.origin, unit = %unit, "recorded");
        self.moved.push(unit);
    }

    /// Forgets a unit recorded as moved, returns whether it was.
    pub fn unrecord(&mut self, role: Role) -> bool {
        let n = self.moved.len();
        self.moved.retain(|p| p.role() != role);
        n != self.moved.len()
    }

    /// Marks a unit as staying.
    pub fn add_stay(&mut self, unit: Piece) {
        debug_assert!(!self.is_accounted(unit.role()));
        self.stay.push(unit);
    }

    /// Unmarks a unit as staying, returns whether it was.
    pub fn remove_stay(&mut self, role: Role) -> bool {
        let n = self.stay.len();
        self.stay.retain(|p| p.role() != role);
        n != self.stay.len()
    }

    /// Stages a change.
    ///
    /// Changes that match the real board are dropped, so the overlay only ever
    /// holds actual differences.
    pub fn write(&mut self, board: &Board, sq: Square, p: Option<Piece>) {
        if board.get(sq) == p.as_ref() {
            self.overlay.remove(&sq);
        } else {
            self.overlay.insert(sq, p);
        }
    }

    /// The board as seen through this deploy.
    #[inline(always)]
    pub fn view<'a>(&'a self, board: &'a Board) -> Effective<'a> {
        Effective::new(board, Some(&self.overlay))
    }

    /// Whether a piece of this deploy was placed on `sq`.
    pub fn is_deployed(&self, sq: Square) -> bool {
        sq != self.origin
            && matches!(self.overlay.get(&sq), Some(Some(p)) if p.color() == self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    fn session() -> DeploySession {
        let origin = "c3".parse().unwrap();
        DeploySession::new(origin, Color::Red, "(NFT)".parse().unwrap())
    }

    #[test]
    fn session_is_complete_once_every_unit_is_accounted() {
        let mut s = session();
        assert_eq!(s.remaining().len(), 3);

        s.record(Piece::new(Color::Red, Role::Tank));
        s.add_stay(Piece::new(Color::Red, Role::Navy));
        assert!(!s.is_complete());
        assert_eq!(s.remaining(), vec![Piece::new(Color::Red, Role::AirForce)]);

        s.record(Piece::new(Color::Red, Role::AirForce));
        assert!(s.is_complete());
    }

    #[test]
    fn unrecord_is_a_no_op_for_units_never_recorded() {
        let mut s = session();
        assert!(!s.unrecord(Role::Tank));
        s.record(Piece::new(Color::Red, Role::Tank));
        assert!(s.unrecord(Role::Tank));
        assert!(!s.unrecord(Role::Tank));
        assert_eq!(s, session());
    }

    #[test]
    fn restored_session_accounts_for_the_given_units() {
        let stack: Piece = "(NFT)".parse().unwrap();
        let moved = vec![Piece::new(Color::Red, Role::AirForce)];
        let stay = vec![Piece::new(Color::Red, Role::Navy)];
        let s = DeploySession::restore("c3".parse().unwrap(), Color::Red, stack, moved, stay);

        assert!(s.overlay().is_empty());
        assert!(s.is_accounted(Role::AirForce));
        assert!(s.is_accounted(Role::Navy));
        assert_eq!(s.remaining(), vec![Piece::new(Color::Red, Role::Tank)]);
    }

    #[proptest]
    fn overlay_never_holds_what_the_board_already_has(sq: Square, p: Piece) {
        let mut board = Board::default();
        let mut s = session();

        s.write(&board, sq, Some(p.clone()));
        assert_eq!(s.view(&board).get(sq), Some(&p));

        s.write(&board, sq, None);
        assert!(s.overlay().is_empty());

        board.set(sq, Some(p.clone()));
        s.write(&board, sq, Some(p));
        assert!(s.overlay().is_empty());
    }

    #[test]
    fn only_friendly_pieces_away_from_origin_are_deployed() {
        let mut s = session();
        let board = Board::default();
        let origin = s.origin();
        let to = "c4".parse().unwrap();

        s.write(&board, origin, Some(Piece::new(Color::Red, Role::Navy)));
        assert!(!s.is_deployed(origin));

        s.write(&board, to, Some(Piece::new(Color::Blue, Role::Tank)));
        assert!(!s.is_deployed(to));

        s.write(&board, to, Some(Piece::new(Color::Red, Role::Tank)));
        assert!(s.is_deployed(to));
    }
}

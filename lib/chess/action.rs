use crate::chess::{DeploySession, Piece, Role, Square};

/// Where [`Action`]s read and write pieces.
pub trait Context {
    /// The piece on `sq`, as currently seen.
    fn get(&self, sq: Square) -> Option<&Piece>;

    /// Replaces the piece on `sq`.
    fn put(&mut self, sq: Square, p: Option<Piece>);

    /// The deploy active right now, if any.
    fn session_mut(&mut self) -> Option<&mut DeploySession>;
}

/// A single reversible change.
///
/// Actions never hold on to the deploy they run in, they ask the [`Context`]
/// for it every time they execute or undo.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Action {
    /// Empties a square.
    Remove {
        at: Square,
        before: Option<Option<Piece>>,
    },
    /// Puts a piece on a square, replacing whatever was there.
    Place {
        at: Square,
        piece: Piece,
        before: Option<Option<Piece>>,
    },
    /// Takes a unit out of the stack on a square.
    Detach {
        at: Square,
        role: Role,
        before: Option<Option<Piece>>,
    },
    /// Makes a unit heroic.
    Promote {
        at: Square,
        role: Role,
        before: Option<Option<Piece>>,
    },
    /// Accounts for a unit in the active deploy.
    Record { unit: Piece, executed: bool },
}

impl Action {
    /// An [`Action::Remove`].
    pub fn remove(at: Square) -> Self {
        Action::Remove { at, before: None }
    }

    /// An [`Action::Place`].
    pub fn place(at: Square, piece: Piece) -> Self {
        Action::Place {
            at,
            piece,
            before: None,
        }
    }

    /// An [`Action::Detach`].
    pub fn detach(at: Square, role: Role) -> Self {
        Action::Detach {
            at,
            role,
            before: None,
        }
    }

    /// An [`Action::Promote`].
    pub fn promote(at: Square, role: Role) -> Self {
        Action::Promote {
            at,
            role,
            before: None,
        }
    }

    /// An [`Action::Record`].
    pub fn record(unit: Piece) -> Self {
        Action::Record {
            unit,
            executed: false,
        }
    }

    /// Applies this action.
    pub fn execute<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        match self {
            Action::Remove { at, before } => {
                *before = Some(ctx.get(*at).cloned());
                ctx.put(*at, None);
            }

            Action::Place { at, piece, before } => {
                *before = Some(ctx.get(*at).cloned());
                ctx.put(*at, Some(piece.clone()));
            }

            Action::Detach { at, role, before } => {
                let p = ctx.get(*at).cloned();
                let rest = p.as_ref().and_then(|p| p.without(*role));
                *before = Some(p);
                ctx.put(*at, rest);
            }

            Action::Promote { at, role, before } => {
                let p = ctx.get(*at).cloned();
                let promoted = p.as_ref().map(|p| p.promoted(*role));
                *before = Some(p);
                ctx.put(*at, promoted);
            }

            Action::Record { unit, executed } => {
                if let Some(s) = ctx.session_mut() {
                    if !s.is_accounted(unit.role()) {
                        s.record(unit.clone());
                    }
                }

                *executed = true;
            }
        }
    }

    /// Reverts this action.
    ///
    /// # Panics
    ///
    /// Panics if the action is not currently executed.
    pub fn undo<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        match self {
            Action::Remove { at, before }
            | Action::Place { at, before, .. }
            | Action::Detach { at, before, .. }
            | Action::Promote { at, before, .. } => {
                let before = before.take();
                assert!(before.is_some(), "undoing an action that never executed");
                ctx.put(*at, before.flatten());
            }

            Action::Record { unit, executed } => {
                assert!(*executed, "undoing an action that never executed");
                if let Some(s) = ctx.session_mut() {
                    s.unrecord(unit.role());
                }

                *executed = false;
            }
        }
    }
}

/// A sequence of [`Action`]s making up one logical change.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Command(Vec<Action>);

impl Command {
    /// Constructs a [`Command`] out of actions not yet executed.
    pub fn new(actions: Vec<Action>) -> Self {
        Command(actions)
    }

    /// The actions in execution order.
    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    /// Executes every action in order.
    pub fn execute<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        for a in &mut self.0 {
            a.execute(ctx);
        }
    }

    /// Undoes every action in reverse order.
    pub fn undo<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        for a in self.0.iter_mut().rev() {
            a.undo(ctx);
        }
    }

    /// Executes one more action and appends it.
    pub fn then<C: Context + ?Sized>(&mut self, mut action: Action, ctx: &mut C) {
        action.execute(ctx);
        self.0.push(action);
    }
}

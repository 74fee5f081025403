use crate::chess::{Clock, Command, DeploySession, Move};

/// What it takes to take back a [`Move`].
///
/// The clock and deploy are captured as they were right before the move.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct HistoryEntry {
    pub(crate) mv: Move,
    pub(crate) command: Command,
    pub(crate) clock: Clock,
    pub(crate) session: Option<DeploySession>,
}

impl HistoryEntry {
    /// The [`Move`] played.
    #[inline(always)]
    pub fn mv(&self) -> &Move {
        &self.mv
    }

    /// The [`Command`] that applied the move.
    #[inline(always)]
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The [`Clock`] before the move.
    #[inline(always)]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The deploy active before the move, if any.
    #[inline(always)]
    pub fn session(&self) -> Option<&DeploySession> {
        self.session.as_ref()
    }

    /// Whether this is a single step of a deploy.
    #[inline(always)]
    pub fn is_step(&self) -> bool {
        self.mv.is_deploy_step()
    }
}

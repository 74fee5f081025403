use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{Game, MoveKind, Square};
use tracing::{info, instrument};

/// Lists the legal moves in a position.
#[derive(Debug, Default, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Moves {
    /// The position, the starting position if omitted.
    #[clap(short, long, default_value_t)]
    position: Game,

    /// Only list moves starting from this square.
    from: Option<Square>,
}

impl Moves {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let moves = match self.from {
            None => self.position.moves(MoveKind::all()),
            Some(sq) => self.position.moves_from(&sq.to_string()),
        };

        for m in &moves {
            println!("{}", self.position.san(m)?);
        }

        info!(moves = moves.len(), check = self.position.is_check());

        Ok(())
    }
}

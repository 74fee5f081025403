use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use lib::chess::Game;
use tracing::{info, instrument};

/// Plays a sequence of moves and prints the resulting position.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Play {
    /// The position, the starting position if omitted.
    #[clap(short, long, default_value_t)]
    position: Game,

    /// Moves in notation, e.g. `Tc3-c5`, `Ac4_c7` or `Tc3>c4`.
    moves: Vec<String>,
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let mut game = self.position;

        for s in &self.moves {
            let m = game
                .submit(s.as_str())
                .with_context(|| format!("failed to play `{s}`"))?;

            info!(%m, turn = %game.turn());
        }

        if let Some(outcome) = game.outcome() {
            info!(%outcome);
        }

        println!("{game}");

        Ok(())
    }
}

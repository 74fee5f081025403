use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use lib::chess::{DeployRequest, Game};
use tracing::{info, instrument};

/// Deploys a whole stack at once and prints the resulting position.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Deploy {
    /// The position, the starting position if omitted.
    #[clap(short, long, default_value_t)]
    position: Game,

    /// The deploy in RON, e.g. `(from: "c3", moves: [(piece: Tank, to: "c4")], stay: [Infantry])`.
    request: String,
}

impl Deploy {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let req: DeployRequest = ron::from_str(&self.request).context("invalid deploy request")?;

        let mut game = self.position;
        let m = game.deploy(&req)?;
        info!(%m, turn = %game.turn());

        println!("{game}");

        Ok(())
    }
}

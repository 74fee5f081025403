use anyhow::Error as Anyhow;
use clap::Subcommand;
use derive_more::From;

mod deploy;
mod moves;
mod perft;
mod play;

#[derive(From, Subcommand)]
pub enum Applet {
    Moves(moves::Moves),
    Play(play::Play),
    Deploy(deploy::Deploy),
    Perft(perft::Perft),
}

impl Default for Applet {
    fn default() -> Self {
        moves::Moves::default().into()
    }
}

impl Applet {
    pub fn execute(self) -> Result<(), Anyhow> {
        match self {
            Applet::Moves(a) => a.execute(),
            Applet::Play(a) => a.execute(),
            Applet::Deploy(a) => a.execute(),
            Applet::Perft(a) => a.execute(),
        }
    }
}

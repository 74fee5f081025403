use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{Game, MoveKind};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, instrument};

/// Counts the nodes of the move tree up to some depth.
///
/// Every deploy step counts as one ply.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Perft {
    /// The position, the starting position if omitted.
    #[clap(short, long, default_value_t)]
    position: Game,

    /// How deep to expand the tree.
    #[clap(short, long, default_value_t = 2)]
    depth: u8,
}

fn perft(game: &mut Game, depth: u8) -> usize {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for m in game.moves(MoveKind::all()) {
        if game.play(&m).is_ok() {
            nodes += perft(game, depth - 1);
            game.undo();
        }
    }

    nodes
}

impl Perft {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let timer = Instant::now();

        let nodes: usize = match self.depth {
            0 => 1,
            d => self
                .position
                .moves(MoveKind::all())
                .into_par_iter()
                .map(|m| {
                    let mut next = self.position.clone();
                    match next.play(&m) {
                        Ok(()) => perft(&mut next, d - 1),
                        Err(_) => 0,
                    }
                })
                .sum(),
        };

        info!(depth = self.depth, time = ?timer.elapsed());
        println!("{nodes}");

        Ok(())
    }
}

use crate::applet::Applet;
use anyhow::Error as Anyhow;
use clap::Parser;
use std::{cmp::min, io::stderr};
use tracing::{instrument, Level};
use tracing_subscriber::fmt::{format::FmtSpan, layer};
use tracing_subscriber::{filter::Targets, prelude::*, registry, util::SubscriberInitExt};

/// Inspects and plays Cờ Tư Lệnh positions.
#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Verbosity level, `debug` also traces deploys as they begin, commit and roll back.
    #[clap(short, long)]
    #[cfg_attr(not(debug_assertions), clap(default_value_t = Level::INFO))]
    #[cfg_attr(debug_assertions, clap(default_value_t = Level::DEBUG))]
    verbosity: Level,

    /// What to do, lists the legal moves of the starting position if omitted.
    #[clap(subcommand)]
    applet: Option<Applet>,
}

impl Cli {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let filter = Targets::new()
            .with_target("cli", self.verbosity)
            .with_target("lib", self.verbosity)
            .with_default(min(Level::WARN, self.verbosity));

        let writer = layer()
            .pretty()
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(stderr);

        registry().with(filter).with(writer).init();

        self.applet.unwrap_or_default().execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn applet_defaults_to_listing_moves() {
        let cli = Cli::try_parse_from(["cli", "-v", "warn"]).unwrap();
        assert_eq!(cli.verbosity, Level::WARN);
        assert!(cli.applet.is_none());
        assert!(matches!(cli.applet.unwrap_or_default(), Applet::Moves(_)));
    }
}

//! Lexgram CLI: the `lexgram` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            output,
            config,
            trees,
            quiet,
            check_ambiguity,
            json,
        } => commands::build::run(commands::build::Args {
            output,
            config,
            trees,
            quiet,
            check_ambiguity,
            json,
        }),

        Commands::Inspect { path, symbol, json } => commands::inspect::run(path, symbol, json),
    }
}

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lexgram",
    about = "Lexgram: build-time compiler for augmented natural-language grammars",
    version
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the registered content modules into a grammar document
    Build {
        /// Where to write the grammar JSON
        #[arg(long, short, default_value = "grammar.json")]
        output: String,

        /// Build options file (TOML, `[build]` table)
        #[arg(long)]
        config: Option<String>,

        /// Emit insertion provenance trees
        #[arg(long)]
        trees: bool,

        /// Warn about unused components instead of failing
        #[arg(long)]
        quiet: bool,

        /// Report rules that share a right-hand side
        #[arg(long)]
        check_ambiguity: bool,

        /// Output the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a grammar document and verify its digest
    Inspect {
        /// Grammar JSON path
        path: String,

        /// Print the rules of one symbol, e.g. `[user-plural]`
        #[arg(long)]
        symbol: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "watchlist-screener")]
#[command(about = "Screen names against a sanctions watchlist", long_about = None)]
pub struct Cli {
    /// Reference list (SDN .xml or .json array of entries)
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Matcher config TOML (default: $MATCHER_CONFIG_PATH or config/matcher.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Best match for each name at the flagging threshold
    Match {
        #[arg(required = true)]
        names: Vec<String>,

        /// Override the flagging threshold
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Ranked, deduplicated search
    Search {
        query: String,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Screen candidate names read from stdin, one per line
    Screen,

    /// Index size summary
    Stats,
}

//! watchlist-screener: command-line front end.
//! Loads the reference list once through the refresh path, then runs one command and prints JSON.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, BufRead};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use watchlist_screener::config::MatcherConfig;
use watchlist_screener::reference::FileReferenceSource;
use watchlist_screener::refresh::refresh_once;
use watchlist_screener::{best_match, screen_mentions, search, IndexHandle, MatchResult};

const DEFAULT_LOG_FILTER: &str = "watchlist_screener=info,refresh=info,reference=info,warn";

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .try_init();
}

#[derive(Serialize)]
struct NameOutcome<'a> {
    name: &'a str,
    #[serde(rename = "match")]
    hit: Option<MatchResult>,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{s}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Picks up MATCHER_* and RUST_LOG from .env in local runs.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let pretty = cli.pretty;

    let config = match &cli.config {
        Some(p) => MatcherConfig::from_path(p)?,
        None => MatcherConfig::load_default()?,
    };

    let handle = IndexHandle::empty();
    let source = FileReferenceSource::new(cli.reference.clone());
    let stats = refresh_once(&handle, &source, &config)
        .await
        .with_context(|| format!("loading reference list {}", cli.reference.display()))?;
    let index = handle.snapshot();

    match cli.command {
        Commands::Match { names, min_score } => {
            let threshold = min_score.unwrap_or(config.thresholds.best_min_score);
            let out: Vec<NameOutcome> = names
                .iter()
                .map(|n| NameOutcome {
                    name: n,
                    hit: best_match(n, &index, threshold),
                })
                .collect();
            print_json(&out, pretty)?;
        }

        Commands::Search { query, limit } => {
            print_json(&search(&query, &index, limit), pretty)?;
        }

        Commands::Screen => {
            let names = io::stdin()
                .lock()
                .lines()
                .collect::<Result<Vec<String>, _>>()
                .context("reading candidate names from stdin")?;
            print_json(&screen_mentions(&names, &index), pretty)?;
        }

        Commands::Stats => print_json(&stats, pretty)?,
    }

    Ok(())
}

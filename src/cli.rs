//! Command-line interface definitions.
//!
//! Arguments can come from flags or environment variables; the API token in
//! particular is usually supplied via `FOOTBALL_DATA_API_TOKEN`.

use clap::{Parser, Subcommand};

/// Command-line arguments for the soccer news pipeline.
///
/// # Examples
///
/// ```sh
/// # Scrape the current articles
/// soccer_news_pipeline articles
///
/// # Refresh player data and show the top ten
/// FOOTBALL_DATA_API_TOKEN=... soccer_news_pipeline players --limit 10
///
/// # Long-running scheduled refresh loop
/// soccer_news_pipeline --config config.yaml run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// football-data.org API token (overrides the config file)
    #[arg(long, env = "FOOTBALL_DATA_API_TOKEN")]
    pub api_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the current BBC Sport Football articles and print them as JSON
    Articles,
    /// Refresh player data, then print the top players as JSON
    Players {
        /// Maximum number of players to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Run a single player refresh and print the summary
    Refresh,
    /// Run the scheduled player refresh loop
    Run,
}

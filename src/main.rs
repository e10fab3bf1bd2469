//! Binary entry point for the soccer news pipeline.
//!
//! Wires configuration into the two pipelines and dispatches on the
//! subcommand: one-shot article scraping, one-shot or scheduled player
//! refreshes, and a JSON dump of the top players.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};
use soccer_news_pipeline::config::AppConfig;
use soccer_news_pipeline::merge::{PlayerStore, UpdateEngine};
use soccer_news_pipeline::pipeline::NewsPipeline;
use soccer_news_pipeline::stats::StatsClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("soccer_news_pipeline starting up");

    let args = Cli::parse();
    debug!(?args.config, command = ?args.command, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(token) = args.api_token.clone() {
        config.api_token = token;
    }
    if config.api_token.is_empty() {
        warn!("No stats API token configured; stats requests will be rejected upstream");
    }

    match args.command {
        Command::Articles => {
            let pipeline = NewsPipeline::new(&config)?;
            let articles = pipeline.fetch_articles().await;
            info!(count = articles.len(), "Article scrape complete");
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
        Command::Players { limit } => {
            let engine = build_engine(&config)?;
            if let Err(e) = engine.refresh().await {
                warn!(error = %e, "Player refresh did not run");
            }
            let players = engine.store().top_players(limit).await;
            info!(count = players.len(), "Top players ready");
            println!("{}", serde_json::to_string_pretty(&players)?);
        }
        Command::Refresh => {
            let engine = build_engine(&config)?;
            match engine.refresh().await {
                Ok(summary) => {
                    info!(
                        upserted = summary.upserted,
                        leagues_failed = summary.leagues_failed,
                        teams_failed = summary.teams_failed,
                        "Manual player refresh complete"
                    );
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                Err(e) => error!(error = %e, "Manual player refresh rejected"),
            }
        }
        Command::Run => {
            let engine = Arc::new(build_engine(&config)?);
            info!(
                interval_secs = config.refresh_interval_secs,
                "Entering scheduled refresh loop"
            );
            engine.run_scheduled(config.refresh_interval()).await;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

fn build_engine(config: &AppConfig) -> Result<UpdateEngine<StatsClient>, Box<dyn Error>> {
    let client = StatsClient::new(config)?;
    Ok(UpdateEngine::new(
        client,
        config.teams.clone(),
        config.nationality.clone(),
        Arc::new(PlayerStore::default()),
    ))
}

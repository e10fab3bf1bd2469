//! # Soccer News Pipeline
//!
//! Data-acquisition core for a soccer news application. Two independent
//! pipelines feed the surrounding app:
//!
//! - **News**: discover article URLs on the BBC Sport Football listing
//!   page, fetch each detail page on its own lightweight task, and extract
//!   title/body/thumbnail through a cascade of selector heuristics.
//! - **Players**: poll the football-data.org API (rate-limited free tier)
//!   for league scorers and team rosters, filter to a target nationality,
//!   join the two views by player name, and upsert canonical merged player
//!   records.
//!
//! ## Architecture
//!
//! ```text
//! listing page ──► discovery ──► bounded URL set ──► concurrent fetcher ──► Vec<Article>
//!
//! team table ──► StatsClient (interval gate + TTL/LRU caches)
//!                    │ scorers per league        │ roster per team
//!                    ▼                           ▼
//!               scorer index ───── name join ────┴──► PlayerStore (upsert)
//! ```
//!
//! The surrounding application consumes three operations:
//! [`NewsPipeline::fetch_articles`], [`PlayerStore::top_players`], and
//! [`UpdateEngine::refresh`]. Everything else (persistence, auth,
//! rendering) lives outside this crate.

pub mod config;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod stats;

pub use config::{AppConfig, TeamSpec};
pub use merge::{MergedPlayer, PlayerStore, RefreshSummary, UpdateEngine};
pub use models::Article;
pub use pipeline::NewsPipeline;
pub use stats::{StatsApi, StatsClient, StatsError};

//! football-data.org API client.
//!
//! Thin GET client over the typed envelope, routed through the interval
//! gate and the per-endpoint response caches. A cache hit returns without
//! touching the network or the gate; a miss claims a request slot before
//! fetching.
//!
//! HTTP 429 maps to the distinguished [`StatsError::RateLimited`] so the
//! merge engine can react to quota exhaustion differently from an ordinary
//! failure. There is no retry-with-backoff anywhere in this path; against a
//! hard per-account quota, failing fast is the safe behavior.

use crate::config::AppConfig;
use crate::stats::cache::ResponseCache;
use crate::stats::limiter::IntervalGate;
use crate::stats::types::StatsEnvelope;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Errors from the stats API path.
#[derive(Debug, Error)]
pub enum StatsError {
    /// HTTP 429: the per-account request quota is exhausted.
    #[error("stats API rate limit exceeded (HTTP 429)")]
    RateLimited,
    /// Any other non-2xx response.
    #[error("stats API returned HTTP {status}")]
    Status { status: u16 },
    /// Network failure or timeout.
    #[error("stats API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body did not match the expected envelope.
    #[error("failed to decode stats API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StatsError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StatsError::RateLimited)
    }
}

/// Read operations the merge engine needs from the stats backend.
///
/// `StatsClient` is the production implementation; tests substitute stubs.
pub trait StatsApi {
    /// Scoring leaderboard for one league.
    async fn league_scorers(&self, league_code: &str) -> Result<StatsEnvelope, StatsError>;

    /// Full team record (with roster) for one team.
    async fn team_roster(&self, team_id: u32) -> Result<StatsEnvelope, StatsError>;
}

/// Rate-limited, cached client for the football-data.org v4 API.
#[derive(Debug)]
pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    gate: IntervalGate,
    scorers_cache: ResponseCache<StatsEnvelope>,
    roster_cache: ResponseCache<StatsEnvelope>,
}

impl StatsClient {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.stats_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            gate: IntervalGate::new(config.min_request_gap()),
            scorers_cache: ResponseCache::new(config.short_ttl(), config.short_cache_capacity),
            roster_cache: ResponseCache::new(config.long_ttl(), config.long_cache_capacity),
        })
    }

    /// Claim a rate slot, fetch `url`, and decode the envelope.
    #[instrument(level = "info", skip(self))]
    async fn fetch_envelope(&self, url: String) -> Result<StatsEnvelope, StatsError> {
        self.gate.wait().await;

        info!(%url, "Requesting stats API");
        let response = self
            .http
            .get(&url)
            .header("X-Auth-Token", &self.api_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!(%url, "stats API quota exhausted (HTTP 429)");
            return Err(StatsError::RateLimited);
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "stats API request failed");
            return Err(StatsError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: StatsEnvelope = serde_json::from_str(&body)?;
        info!(
            %url,
            scorers = envelope.scorers.len(),
            squad = envelope.squad.len(),
            "Decoded stats API response"
        );
        Ok(envelope)
    }
}

impl StatsApi for StatsClient {
    async fn league_scorers(&self, league_code: &str) -> Result<StatsEnvelope, StatsError> {
        let url = format!("{}/competitions/{}/scorers", self.base_url, league_code);
        self.scorers_cache
            .get_or_fetch(league_code, || self.fetch_envelope(url))
            .await
    }

    async fn team_roster(&self, team_id: u32) -> Result<StatsEnvelope, StatsError> {
        let url = format!("{}/teams/{}", self.base_url, team_id);
        self.roster_cache
            .get_or_fetch(&team_id.to_string(), || self.fetch_envelope(url))
            .await
    }
}

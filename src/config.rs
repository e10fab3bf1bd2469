//! Runtime configuration for the acquisition pipelines.
//!
//! All tunables live in [`AppConfig`]: the stats API token and base URL, the
//! news listing page, timeouts, cache TTLs and capacities, the rate-limit
//! spacing, and the hand-curated [`TeamSpec`] table. Values can be loaded
//! from a YAML file and selectively overridden from the CLI; anything not
//! supplied falls back to the defaults the application shipped with.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::info;

/// One entry of the tracked-team reference table.
///
/// Maps a football-data.org team identifier to display names and the league
/// code used for the scorers endpoint. This is fixed, hand-curated reference
/// data, not runtime state; the table is kept as an ordered list so league
/// codes derive in a stable first-seen order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamSpec {
    /// football-data.org team id, used for `/v4/teams/{id}`.
    pub team_id: u32,
    /// Display name for the team.
    pub team_name: String,
    /// Localized league label. May be empty, in which case the label is
    /// derived from `league_code` via [`league_label`].
    #[serde(default)]
    pub league_name: String,
    /// football-data.org competition code (`PL`, `PD`, `BL1`, ...).
    pub league_code: String,
}

/// Top-level application configuration.
///
/// Every field has a sensible default, so a missing or partial config file
/// still yields a runnable configuration. The API token is the only value
/// that must come from outside (file, flag, or `FOOTBALL_DATA_API_TOKEN`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// football-data.org API token, sent as `X-Auth-Token`.
    pub api_token: String,
    /// Base URL of the stats API.
    pub stats_base_url: String,
    /// Listing page scanned for article links.
    pub news_listing_url: String,
    /// Origin used to absolutize root-relative article asset URLs.
    pub news_origin: String,
    /// User-agent sent on every outbound request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum number of articles fetched per pipeline run.
    pub article_cap: usize,
    /// TTL for league scorer responses (in-season churn).
    pub short_ttl_secs: u64,
    /// TTL for team roster responses (low roster churn).
    pub long_ttl_secs: u64,
    /// Capacity of the short-TTL cache.
    pub short_cache_capacity: usize,
    /// Capacity of the long-TTL cache.
    pub long_cache_capacity: usize,
    /// Minimum spacing between consecutive stats API requests, in
    /// milliseconds. The free tier allows 10 requests per minute; 6500 ms
    /// keeps us at 9.
    pub min_request_gap_ms: u64,
    /// Nationality the player pipelines filter for.
    pub nationality: String,
    /// Interval between scheduled player refreshes, in seconds.
    pub refresh_interval_secs: u64,
    /// Tracked teams, in priority order.
    pub teams: Vec<TeamSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            stats_base_url: "https://api.football-data.org/v4".to_string(),
            news_listing_url: "https://www.bbc.com/sport/football".to_string(),
            news_origin: "https://www.bbc.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            request_timeout_secs: 10,
            article_cap: 5,
            short_ttl_secs: 60 * 60,
            long_ttl_secs: 24 * 60 * 60,
            short_cache_capacity: 1000,
            long_cache_capacity: 100,
            min_request_gap_ms: 6500,
            nationality: "Japan".to_string(),
            refresh_interval_secs: 12 * 60 * 60,
            teams: default_teams(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Missing fields fall back to their defaults, so a file may override
    /// only the values it cares about.
    pub fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&raw)?;
        info!(path, teams = config.teams.len(), "Loaded configuration");
        Ok(config)
    }

    /// Distinct league codes referenced by the team table, first-seen order.
    pub fn league_codes(&self) -> Vec<String> {
        self.teams
            .iter()
            .map(|t| t.league_code.clone())
            .unique()
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn short_ttl(&self) -> Duration {
        Duration::from_secs(self.short_ttl_secs)
    }

    pub fn long_ttl(&self) -> Duration {
        Duration::from_secs(self.long_ttl_secs)
    }

    pub fn min_request_gap(&self) -> Duration {
        Duration::from_millis(self.min_request_gap_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Localized label for a football-data.org competition code.
///
/// Unknown codes fall back to a generic "European league" label rather than
/// failing; the table only needs to cover the leagues the team table uses.
pub fn league_label(code: &str) -> &'static str {
    match code {
        "PL" => "プレミアリーグ",
        "PD" => "ラ・リーガ",
        "DED" => "エールディヴィジ",
        "BL1" => "ブンデスリーガ",
        "SA" => "セリエA",
        "FL1" => "リーグ・アン",
        _ => "欧州リーグ",
    }
}

/// Built-in team table: clubs with Japanese internationals in their squads.
fn default_teams() -> Vec<TeamSpec> {
    fn spec(team_id: u32, team_name: &str, league_name: &str, league_code: &str) -> TeamSpec {
        TeamSpec {
            team_id,
            team_name: team_name.to_string(),
            league_name: league_name.to_string(),
            league_code: league_code.to_string(),
        }
    }

    vec![
        spec(92, "レアル・ソシエダ", "ラ・リーガ", "PD"),
        spec(397, "ブライトン", "プレミアリーグ", "PL"),
        spec(678, "アヤックス", "エールディヴィジ", "DED"),
        spec(64, "リヴァプール", "プレミアリーグ", "PL"),
        spec(675, "フェイエノールト", "エールディヴィジ", "DED"),
        spec(12, "フライブルク", "ブンデスリーガ", "BL1"),
        spec(354, "クリスタル・パレス", "プレミアリーグ", "PL"),
        spec(5, "バイエルン・ミュンヘン", "ブンデスリーガ", "BL1"),
        spec(548, "ASモナコ", "リーグ・アン", "FL1"),
        spec(547, "スタッド・ランス", "リーグ・アン", "FL1"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_complete() {
        let config = AppConfig::default();
        assert!(!config.teams.is_empty());
        assert_eq!(config.article_cap, 5);
        assert_eq!(config.min_request_gap_ms, 6500);
        assert_eq!(config.nationality, "Japan");
        assert!(config.stats_base_url.starts_with("https://"));
    }

    #[test]
    fn test_league_codes_distinct_first_seen_order() {
        let config = AppConfig::default();
        let codes = config.league_codes();
        assert_eq!(codes, vec!["PD", "PL", "DED", "BL1", "FL1"]);
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let yaml = r#"
api_token: "secret"
article_cap: 3
teams:
  - team_id: 92
    team_name: "Real Sociedad"
    league_code: "PD"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api_token, "secret");
        assert_eq!(config.article_cap, 3);
        assert_eq!(config.teams.len(), 1);
        assert_eq!(config.teams[0].league_name, "");
        // untouched fields keep their defaults
        assert_eq!(config.min_request_gap_ms, 6500);
        assert_eq!(config.nationality, "Japan");
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.teams, config.teams);
        assert_eq!(parsed.short_ttl_secs, config.short_ttl_secs);
    }

    #[test]
    fn test_league_label_known_and_fallback() {
        assert_eq!(league_label("PL"), "プレミアリーグ");
        assert_eq!(league_label("SA"), "セリエA");
        assert_eq!(league_label("XYZ"), "欧州リーグ");
    }
}

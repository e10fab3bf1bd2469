//! Merge & update engine for tracked players.
//!
//! Combines two independent football-data.org views of the same players:
//! per-league scoring leaderboards and per-team rosters. The join key is the
//! player name — the two endpoints do not share an ID space, so this is an
//! explicit best-effort string join, not an identity join. Roster entries
//! with no leaderboard match keep zeroed scoring fields; a roster appearance
//! alone is worth recording.
//!
//! The engine runs the identical algorithm on a fixed schedule and on
//! demand. Overlapping triggers are rejected rather than queued, so the
//! canonical store is only ever written by one run at a time.

use crate::config::{TeamSpec, league_label};
use crate::stats::client::{StatsApi, StatsError};
use crate::stats::types::{ScorerRecord, SquadMember, scorers_of_nationality, squad_of_nationality};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};

/// The canonical, join-and-upsert result for one tracked player.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MergedPlayer {
    /// Player name; the join and upsert key.
    pub name: String,
    pub team_name: String,
    pub league_name: String,
    pub position: Option<String>,
    pub shirt_number: Option<u32>,
    pub goals: u32,
    pub assists: u32,
    pub matches_played: u32,
    /// Provider player id, prefixed with the source tag (`FD-`).
    pub api_player_id: Option<String>,
    /// When this record was last produced by a refresh.
    pub last_seen: DateTime<Utc>,
}

impl MergedPlayer {
    /// Weighted activity score used for ranking: goals count triple,
    /// assists double, appearances once.
    pub fn activity_score(&self) -> u32 {
        self.goals * 3 + self.assists * 2 + self.matches_played
    }
}

/// In-memory canonical store of merged players, keyed by name.
///
/// Written only by the single-flight engine; read freely. Records are
/// replaced wholesale on upsert and never deleted here — expiry, if any,
/// belongs to the surrounding persistence layer.
#[derive(Debug, Default)]
pub struct PlayerStore {
    players: RwLock<HashMap<String, MergedPlayer>>,
}

impl PlayerStore {
    /// Insert-or-replace by player name.
    pub async fn upsert(&self, player: MergedPlayer) {
        let mut players = self.players.write().await;
        players.insert(player.name.clone(), player);
    }

    pub async fn get(&self, name: &str) -> Option<MergedPlayer> {
        self.players.read().await.get(name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    /// Top players by [`MergedPlayer::activity_score`], descending.
    /// Ties break on name so the ordering is stable across runs.
    pub async fn top_players(&self, limit: usize) -> Vec<MergedPlayer> {
        let players = self.players.read().await;
        players
            .values()
            .cloned()
            .sorted_by(|a, b| {
                b.activity_score()
                    .cmp(&a.activity_score())
                    .then_with(|| a.name.cmp(&b.name))
            })
            .take(limit)
            .collect()
    }
}

/// Index scorer rows by player name for the roster merge.
///
/// Later duplicates of the same name win, matching upsert semantics.
pub fn scorer_index(scorers: Vec<ScorerRecord>) -> HashMap<String, ScorerRecord> {
    let mut index = HashMap::new();
    for scorer in scorers {
        if let Some(name) = scorer.player_name() {
            index.insert(name.to_string(), scorer);
        }
    }
    index
}

/// Merge one roster entry with its scorer row, if any.
///
/// Scoring fields default to zero when the player has no leaderboard entry.
/// Returns `None` for nameless roster rows — without a name there is
/// nothing to join or upsert on.
pub fn merge_member(
    member: &SquadMember,
    spec: &TeamSpec,
    scorer: Option<&ScorerRecord>,
    now: DateTime<Utc>,
) -> Option<MergedPlayer> {
    let name = member.name.clone()?;
    let (goals, assists, matches_played) = match scorer {
        Some(s) => (
            s.goals.unwrap_or(0),
            s.assists.unwrap_or(0),
            s.played_matches.unwrap_or(0),
        ),
        None => (0, 0, 0),
    };

    let league_name = if spec.league_name.is_empty() {
        league_label(&spec.league_code).to_string()
    } else {
        spec.league_name.clone()
    };

    Some(MergedPlayer {
        name,
        team_name: spec.team_name.clone(),
        league_name,
        position: member.position.clone(),
        shirt_number: member.shirt_number,
        goals,
        assists,
        matches_played,
        api_player_id: member.id.map(|id| format!("FD-{id}")),
        last_seen: now,
    })
}

/// Outcome of one refresh run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshSummary {
    /// Players upserted into the canonical store.
    pub upserted: usize,
    /// Leagues whose scorer fetch failed and was skipped.
    pub leagues_failed: usize,
    /// Teams whose roster fetch failed and was skipped.
    pub teams_failed: usize,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    /// Another refresh holds the single-flight lock; this trigger was
    /// rejected, not queued.
    #[error("a player refresh is already running")]
    AlreadyRunning,
}

/// Orchestrates scorer/roster fetching and the name-based merge.
#[derive(Debug)]
pub struct UpdateEngine<C> {
    client: C,
    teams: Vec<TeamSpec>,
    nationality: String,
    store: Arc<PlayerStore>,
    refresh_lock: Mutex<()>,
}

impl<C: StatsApi> UpdateEngine<C> {
    pub fn new(client: C, teams: Vec<TeamSpec>, nationality: String, store: Arc<PlayerStore>) -> Self {
        Self {
            client,
            teams,
            nationality,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<PlayerStore> {
        Arc::clone(&self.store)
    }

    /// Run one full refresh: scorers per league, then roster per team, then
    /// upsert every merged player.
    ///
    /// Fetches are sequential on purpose — the interval gate under the
    /// client already serializes traffic, and deliberate spacing between
    /// distinct calls is part of staying inside the quota. A failure on one
    /// league or team (including a 429) is logged and skipped; everything
    /// gathered before and after still lands in the store. A run that
    /// gathers nothing reports zero upserts rather than failing.
    #[instrument(level = "info", skip_all)]
    pub async fn refresh(&self) -> Result<RefreshSummary, RefreshError> {
        let _guard = self
            .refresh_lock
            .try_lock()
            .map_err(|_| RefreshError::AlreadyRunning)?;

        let started = std::time::Instant::now();
        let mut summary = RefreshSummary::default();

        // Leagues first: the roster merge needs the full scorer index.
        let league_codes: Vec<String> = self
            .teams
            .iter()
            .map(|t| t.league_code.clone())
            .unique()
            .collect();
        info!(leagues = league_codes.len(), teams = self.teams.len(), "Player refresh starting");

        let mut index: HashMap<String, ScorerRecord> = HashMap::new();
        for code in &league_codes {
            match self.client.league_scorers(code).await {
                Ok(envelope) => {
                    let matched = scorers_of_nationality(&envelope.scorers, &self.nationality);
                    info!(league = %code, scorers = matched.len(), "Indexed league scorers");
                    index.extend(scorer_index(matched));
                }
                Err(e) => {
                    summary.leagues_failed += 1;
                    warn!(league = %code, error = %e, "Scorer fetch failed; skipping league");
                }
            }
        }

        let now = Utc::now();
        for spec in &self.teams {
            match self.client.team_roster(spec.team_id).await {
                Ok(envelope) => {
                    let members = squad_of_nationality(&envelope.squad, &self.nationality);
                    info!(team = %spec.team_name, members = members.len(), "Merging team roster");
                    for member in &members {
                        let scorer = member.name.as_deref().and_then(|n| index.get(n));
                        if let Some(player) = merge_member(member, spec, scorer, now) {
                            self.store.upsert(player).await;
                            summary.upserted += 1;
                        }
                    }
                }
                Err(e) => {
                    summary.teams_failed += 1;
                    error!(
                        team = %spec.team_name,
                        team_id = spec.team_id,
                        error = %e,
                        "Roster fetch failed; skipping team"
                    );
                }
            }
        }

        info!(
            upserted = summary.upserted,
            leagues_failed = summary.leagues_failed,
            teams_failed = summary.teams_failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Player refresh complete"
        );
        Ok(summary)
    }

    /// Scheduled refresh loop. The first run fires immediately, then one
    /// per `period`. A rejected overlap (manual trigger still in flight)
    /// is logged and the loop waits for the next tick.
    pub async fn run_scheduled(&self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match self.refresh().await {
                Ok(summary) => info!(
                    upserted = summary.upserted,
                    leagues_failed = summary.leagues_failed,
                    teams_failed = summary.teams_failed,
                    "Scheduled player refresh finished"
                ),
                Err(e) => warn!(error = %e, "Scheduled player refresh skipped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::types::{PlayerInfo, StatsEnvelope};
    use std::collections::HashSet;

    fn spec(team_id: u32, team_name: &str, league_code: &str) -> TeamSpec {
        TeamSpec {
            team_id,
            team_name: team_name.to_string(),
            league_name: String::new(),
            league_code: league_code.to_string(),
        }
    }

    fn member(id: u64, name: &str, position: &str, shirt: u32) -> SquadMember {
        SquadMember {
            id: Some(id),
            name: Some(name.to_string()),
            position: Some(position.to_string()),
            nationality: Some("Japan".to_string()),
            shirt_number: Some(shirt),
            ..Default::default()
        }
    }

    fn scorer(name: &str, goals: u32, assists: u32, matches: u32) -> ScorerRecord {
        ScorerRecord {
            player: Some(PlayerInfo {
                name: Some(name.to_string()),
                nationality: Some("Japan".to_string()),
                ..Default::default()
            }),
            goals: Some(goals),
            assists: Some(assists),
            played_matches: Some(matches),
            ..Default::default()
        }
    }

    /// Stub backend: canned envelopes per league/team, with optional
    /// rate-limited teams.
    struct StubApi {
        scorers: HashMap<String, StatsEnvelope>,
        rosters: HashMap<u32, StatsEnvelope>,
        rate_limited_teams: HashSet<u32>,
    }

    impl StubApi {
        fn new() -> Self {
            Self {
                scorers: HashMap::new(),
                rosters: HashMap::new(),
                rate_limited_teams: HashSet::new(),
            }
        }

        fn with_scorers(mut self, code: &str, scorers: Vec<ScorerRecord>) -> Self {
            self.scorers.insert(
                code.to_string(),
                StatsEnvelope {
                    scorers,
                    ..Default::default()
                },
            );
            self
        }

        fn with_roster(mut self, team_id: u32, squad: Vec<SquadMember>) -> Self {
            self.rosters.insert(
                team_id,
                StatsEnvelope {
                    squad,
                    ..Default::default()
                },
            );
            self
        }

        fn rate_limiting(mut self, team_id: u32) -> Self {
            self.rate_limited_teams.insert(team_id);
            self
        }
    }

    impl StatsApi for StubApi {
        async fn league_scorers(&self, league_code: &str) -> Result<StatsEnvelope, StatsError> {
            self.scorers
                .get(league_code)
                .cloned()
                .ok_or(StatsError::Status { status: 404 })
        }

        async fn team_roster(&self, team_id: u32) -> Result<StatsEnvelope, StatsError> {
            if self.rate_limited_teams.contains(&team_id) {
                return Err(StatsError::RateLimited);
            }
            self.rosters
                .get(&team_id)
                .cloned()
                .ok_or(StatsError::Status { status: 404 })
        }
    }

    fn engine(client: StubApi, teams: Vec<TeamSpec>) -> UpdateEngine<StubApi> {
        UpdateEngine::new(
            client,
            teams,
            "Japan".to_string(),
            Arc::new(PlayerStore::default()),
        )
    }

    #[tokio::test]
    async fn test_roster_only_player_gets_zero_filled_stats() {
        let client = StubApi::new()
            .with_scorers("PD", vec![])
            .with_roster(92, vec![member(38101, "Kubo", "Right Winger", 14)]);
        let engine = engine(client, vec![spec(92, "Real Sociedad", "PD")]);

        let summary = engine.refresh().await.unwrap();
        assert_eq!(summary.upserted, 1);

        let kubo = engine.store().get("Kubo").await.unwrap();
        assert_eq!(kubo.goals, 0);
        assert_eq!(kubo.assists, 0);
        assert_eq!(kubo.matches_played, 0);
        assert_eq!(kubo.team_name, "Real Sociedad");
        assert_eq!(kubo.league_name, "ラ・リーガ");
        assert_eq!(kubo.position.as_deref(), Some("Right Winger"));
        assert_eq!(kubo.shirt_number, Some(14));
        assert_eq!(kubo.api_player_id.as_deref(), Some("FD-38101"));
    }

    #[tokio::test]
    async fn test_scorer_stats_merge_by_name() {
        let client = StubApi::new()
            .with_scorers("PL", vec![scorer("Kaoru Mitoma", 8, 5, 22)])
            .with_roster(397, vec![member(7888, "Kaoru Mitoma", "Left Winger", 22)]);
        let engine = engine(client, vec![spec(397, "Brighton", "PL")]);

        engine.refresh().await.unwrap();
        let mitoma = engine.store().get("Kaoru Mitoma").await.unwrap();
        assert_eq!(mitoma.goals, 8);
        assert_eq!(mitoma.assists, 5);
        assert_eq!(mitoma.matches_played, 22);
        assert_eq!(mitoma.activity_score(), 8 * 3 + 5 * 2 + 22);
    }

    #[tokio::test]
    async fn test_rate_limited_team_is_skipped_others_survive() {
        let client = StubApi::new()
            .with_scorers("PL", vec![])
            .with_roster(1, vec![member(1, "Player One", "Midfielder", 6)])
            .with_roster(3, vec![member(3, "Player Three", "Defender", 4)])
            .rate_limiting(2);
        let engine = engine(
            client,
            vec![
                spec(1, "Team One", "PL"),
                spec(2, "Team Two", "PL"),
                spec(3, "Team Three", "PL"),
            ],
        );

        let summary = engine.refresh().await.unwrap();
        assert_eq!(summary.upserted, 2);
        assert_eq!(summary.teams_failed, 1);
        assert!(engine.store().get("Player One").await.is_some());
        assert!(engine.store().get("Player Three").await.is_some());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent_for_unchanged_upstream() {
        let client = StubApi::new()
            .with_scorers("PL", vec![scorer("Kaoru Mitoma", 8, 5, 22)])
            .with_roster(
                397,
                vec![
                    member(7888, "Kaoru Mitoma", "Left Winger", 22),
                    member(9000, "Joel Veltman", "Defender", 34),
                ],
            );
        // Veltman is Dutch in reality; here he is a fixture with Japanese
        // nationality so the filter keeps two members.
        let engine = engine(client, vec![spec(397, "Brighton", "PL")]);

        engine.refresh().await.unwrap();
        let first = engine.store().top_players(10).await;
        engine.refresh().await.unwrap();
        let second = engine.store().top_players(10).await;

        assert_eq!(engine.store().len().await, 2);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.goals, b.goals);
            assert_eq!(a.assists, b.assists);
            assert_eq!(a.matches_played, b.matches_played);
        }
    }

    #[tokio::test]
    async fn test_total_failure_reports_zero_upserts() {
        let engine = engine(StubApi::new(), vec![spec(92, "Real Sociedad", "PD")]);
        let summary = engine.refresh().await.unwrap();
        assert_eq!(summary.upserted, 0);
        assert_eq!(summary.leagues_failed, 1);
        assert_eq!(summary.teams_failed, 1);
        assert_eq!(engine.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_activity_score_ranking() {
        let store = PlayerStore::default();
        let now = Utc::now();
        let base = MergedPlayer {
            name: String::new(),
            team_name: "T".to_string(),
            league_name: "L".to_string(),
            position: None,
            shirt_number: None,
            goals: 0,
            assists: 0,
            matches_played: 0,
            api_player_id: None,
            last_seen: now,
        };

        store
            .upsert(MergedPlayer {
                name: "Second".to_string(),
                goals: 6,
                assists: 4,
                matches_played: 20, // score 38
                ..base.clone()
            })
            .await;
        store
            .upsert(MergedPlayer {
                name: "First".to_string(),
                goals: 8,
                assists: 5,
                matches_played: 22, // score 46
                ..base.clone()
            })
            .await;

        let top = store.top_players(10).await;
        assert_eq!(top[0].name, "First");
        assert_eq!(top[0].activity_score(), 46);
        assert_eq!(top[1].name, "Second");
        assert_eq!(top[1].activity_score(), 38);

        let only_one = store.top_players(1).await;
        assert_eq!(only_one.len(), 1);
    }

    /// Stub whose league fetch is slow enough to hold the single-flight
    /// lock while a second trigger arrives.
    struct SlowApi;

    impl StatsApi for SlowApi {
        async fn league_scorers(&self, _league_code: &str) -> Result<StatsEnvelope, StatsError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(StatsEnvelope::default())
        }

        async fn team_roster(&self, _team_id: u32) -> Result<StatsEnvelope, StatsError> {
            Ok(StatsEnvelope::default())
        }
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_rejected() {
        let engine = Arc::new(UpdateEngine::new(
            SlowApi,
            vec![spec(92, "Real Sociedad", "PD")],
            "Japan".to_string(),
            Arc::new(PlayerStore::default()),
        ));

        let background = Arc::clone(&engine);
        let first = tokio::spawn(async move { background.refresh().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = engine.refresh().await;
        assert!(matches!(second, Err(RefreshError::AlreadyRunning)));
        first.await.unwrap().unwrap();
    }

    #[test]
    fn test_merge_member_without_name_is_dropped() {
        let nameless = SquadMember {
            id: Some(1),
            ..Default::default()
        };
        let result = merge_member(&nameless, &spec(1, "T", "PL"), None, Utc::now());
        assert!(result.is_none());
    }
}

//! Typed envelope for football-data.org v4 responses.
//!
//! Both endpoints this client consumes reply with variations of the same
//! envelope: `/competitions/{code}/scorers` populates `scorers`, while
//! `/teams/{id}` populates `squad`. Every field is optional or defaulted so
//! new upstream fields (and absent ones) never break parsing; forward
//! compatibility with the provider's schema is a hard requirement here.

use serde::Deserialize;

/// Common response envelope for the scorers and team endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsEnvelope {
    pub count: Option<u32>,
    pub competition: Option<Competition>,
    pub season: Option<Season>,
    /// Populated by the league scorers endpoint.
    pub scorers: Vec<ScorerRecord>,
    /// Populated by the team endpoint.
    pub squad: Vec<SquadMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Competition {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Season {
    pub id: Option<u64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current_matchday: Option<u32>,
}

/// One row of a league scoring leaderboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScorerRecord {
    pub player: Option<PlayerInfo>,
    pub team: Option<TeamInfo>,
    pub played_matches: Option<u32>,
    pub goals: Option<u32>,
    pub assists: Option<u32>,
    pub penalties: Option<u32>,
}

impl ScorerRecord {
    /// Player name, when the upstream record carries one.
    pub fn player_name(&self) -> Option<&str> {
        self.player.as_ref().and_then(|p| p.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub position: Option<String>,
    pub shirt_number: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamInfo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub tla: Option<String>,
}

/// One roster entry from the team endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SquadMember {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub shirt_number: Option<u32>,
}

/// Scorer rows whose player matches `nationality` (case-insensitive).
pub fn scorers_of_nationality(scorers: &[ScorerRecord], nationality: &str) -> Vec<ScorerRecord> {
    scorers
        .iter()
        .filter(|s| {
            s.player
                .as_ref()
                .and_then(|p| p.nationality.as_deref())
                .is_some_and(|n| n.eq_ignore_ascii_case(nationality))
        })
        .cloned()
        .collect()
}

/// Roster entries matching `nationality` (case-insensitive).
pub fn squad_of_nationality(squad: &[SquadMember], nationality: &str) -> Vec<SquadMember> {
    squad
        .iter()
        .filter(|m| {
            m.nationality
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(nationality))
        })
        .cloned()
        .collect()
}

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::LensError;
use crate::http_client::get_api_json;
use crate::state::{
    FixtureRow, LeagueRow, LineupPlayer, MatchdayGroup, PlayerStatRow, StandingRow, TeamLineup,
};

pub fn fetch_all_leagues(api: &ApiConfig) -> Result<Vec<LeagueRow>> {
    let body = get_api_json(api, "leagues", &[]).context("leagues request failed")?;
    parse_leagues_json(&body)
}

pub fn search_leagues(api: &ApiConfig, query: &str) -> Result<Vec<LeagueRow>> {
    let body = get_api_json(api, "leagues", &[("search", query.to_string())])
        .context("league search failed")?;
    parse_leagues_json(&body)
}

pub fn fetch_standings(api: &ApiConfig, league_id: u32, season: &str) -> Result<Vec<StandingRow>> {
    let body = get_api_json(
        api,
        "standings",
        &[("season", season.to_string()), ("league", league_id.to_string())],
    )
    .context("standings request failed")?;
    parse_standings_json(&body)
}

pub fn fetch_top_scorers(api: &ApiConfig, league_id: u32, season: &str) -> Result<Vec<PlayerStatRow>> {
    let body = get_api_json(
        api,
        "players/topscorers",
        &[("league", league_id.to_string()), ("season", season.to_string())],
    )
    .context("top scorers request failed")?;
    parse_top_players_json(&body)
}

pub fn fetch_top_assists(api: &ApiConfig, league_id: u32, season: &str) -> Result<Vec<PlayerStatRow>> {
    let body = get_api_json(
        api,
        "players/topassists",
        &[("league", league_id.to_string()), ("season", season.to_string())],
    )
    .context("top assists request failed")?;
    parse_top_players_json(&body)
}

pub fn fetch_fixtures(api: &ApiConfig, league_id: u32, season: &str) -> Result<Vec<MatchdayGroup>> {
    let body = get_api_json(
        api,
        "fixtures",
        &[("league", league_id.to_string()), ("season", season.to_string())],
    )
    .context("fixtures request failed")?;
    parse_fixtures_json(&body)
}

pub fn fetch_lineups(api: &ApiConfig, fixture_id: u64) -> Result<Vec<TeamLineup>> {
    let body = get_api_json(api, "fixtures/lineups", &[("fixture", fixture_id.to_string())])
        .context("lineups request failed")?;
    parse_lineups_json(&body)
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Envelope<T> {
    #[serde(default)]
    errors: Value,
    #[serde(default = "Vec::new")]
    response: Vec<T>,
}

/// Every endpoint wraps its items in `response`. The API reports bad keys
/// and quota problems in a non-empty `errors` object with a 200 status.
fn parse_envelope<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let env: Envelope<T> = serde_json::from_str(trimmed).map_err(|err| LensError::Parse {
        what,
        reason: err.to_string(),
    })?;
    if let Some(errors) = env.errors.as_object() {
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(|(k, v)| format!("{k}: {}", v.as_str().unwrap_or_default()))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(anyhow!("api error ({what}): {detail}"));
        }
    }
    Ok(env.response)
}

/// Missing keys and `null` both read as an empty string; numbers keep their
/// text form.
fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Deserialize)]
struct ApiLeagueItem {
    league: ApiLeague,
    #[serde(default)]
    country: ApiCountry,
}

#[derive(Debug, Deserialize)]
struct ApiLeague {
    id: u32,
    #[serde(default, deserialize_with = "string_or_default")]
    name: String,
    #[serde(rename = "type", default, deserialize_with = "string_or_default")]
    league_type: String,
    #[serde(default, deserialize_with = "string_or_default")]
    logo: String,
}

#[derive(Debug, Deserialize, Default)]
struct ApiCountry {
    #[serde(default, deserialize_with = "string_or_default")]
    name: String,
}

pub fn parse_leagues_json(raw: &str) -> Result<Vec<LeagueRow>> {
    let items: Vec<ApiLeagueItem> = parse_envelope(raw, "leagues")?;
    Ok(items
        .into_iter()
        .map(|item| LeagueRow {
            league_id: item.league.id,
            name: item.league.name,
            league_type: item.league.league_type,
            logo: item.league.logo,
            country: item.country.name,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ApiStandingsItem {
    league: ApiStandingsLeague,
}

#[derive(Debug, Deserialize)]
struct ApiStandingsLeague {
    #[serde(default)]
    standings: Vec<Vec<ApiStanding>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiStanding {
    rank: u32,
    team: ApiTeam,
    #[serde(default)]
    points: i32,
    #[serde(default)]
    goals_diff: i32,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    all: ApiRecord,
}

#[derive(Debug, Deserialize, Default)]
struct ApiTeam {
    #[serde(default, deserialize_with = "string_or_default")]
    name: String,
    #[serde(default, deserialize_with = "string_or_default")]
    logo: String,
}

#[derive(Debug, Deserialize, Default)]
struct ApiRecord {
    #[serde(default)]
    played: Option<u32>,
    #[serde(default)]
    win: Option<u32>,
    #[serde(default)]
    draw: Option<u32>,
    #[serde(default)]
    lose: Option<u32>,
    #[serde(default)]
    goals: ApiGoalsForAgainst,
}

#[derive(Debug, Deserialize, Default)]
struct ApiGoalsForAgainst {
    #[serde(rename = "for", default)]
    scored: Option<u32>,
    #[serde(default)]
    against: Option<u32>,
}

/// The first standings table of the first league entry. Competitions split
/// into groups list one table per group; only the first is shown.
pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingRow>> {
    let items: Vec<ApiStandingsItem> = parse_envelope(raw, "standings")?;
    let Some(table) = items
        .into_iter()
        .next()
        .and_then(|item| item.league.standings.into_iter().next())
    else {
        return Ok(Vec::new());
    };
    Ok(table
        .into_iter()
        .map(|s| StandingRow {
            rank: s.rank,
            team: s.team.name,
            logo: s.team.logo,
            played: s.all.played.unwrap_or(0),
            win: s.all.win.unwrap_or(0),
            draw: s.all.draw.unwrap_or(0),
            lose: s.all.lose.unwrap_or(0),
            points: s.points,
            goals_for: s.all.goals.scored.unwrap_or(0),
            goals_against: s.all.goals.against.unwrap_or(0),
            goal_diff: s.goals_diff,
            form: s.form.unwrap_or_default(),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ApiPlayerItem {
    player: ApiPlayer,
    #[serde(default)]
    statistics: Vec<ApiPlayerStats>,
}

#[derive(Debug, Deserialize)]
struct ApiPlayer {
    #[serde(default, deserialize_with = "string_or_default")]
    name: String,
    #[serde(default)]
    firstname: Option<String>,
    #[serde(default)]
    lastname: Option<String>,
    #[serde(default, deserialize_with = "string_or_default")]
    photo: String,
}

#[derive(Debug, Deserialize)]
struct ApiPlayerStats {
    #[serde(default)]
    team: ApiTeam,
    #[serde(default)]
    goals: ApiPlayerGoals,
}

#[derive(Debug, Deserialize, Default)]
struct ApiPlayerGoals {
    #[serde(default)]
    total: Option<u32>,
    #[serde(default)]
    assists: Option<u32>,
}

/// Shared by the top scorers and top assists endpoints. Rank follows the
/// response order; points are goals plus assists with nulls counted as zero.
pub fn parse_top_players_json(raw: &str) -> Result<Vec<PlayerStatRow>> {
    let items: Vec<ApiPlayerItem> = parse_envelope(raw, "top players")?;
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let stats = item.statistics.into_iter().next();
            let goals = stats.as_ref().and_then(|s| s.goals.total).unwrap_or(0);
            let assists = stats.as_ref().and_then(|s| s.goals.assists).unwrap_or(0);
            PlayerStatRow {
                rank: idx + 1,
                name: display_name(&item.player),
                photo: item.player.photo,
                team: stats.map(|s| s.team.name).unwrap_or_default(),
                goals,
                assists,
                points: goals + assists,
            }
        })
        .collect())
}

fn display_name(player: &ApiPlayer) -> String {
    let first = player.firstname.as_deref().map(str::trim).unwrap_or_default();
    let last = player.lastname.as_deref().map(str::trim).unwrap_or_default();
    let full = format!("{first} {last}");
    let full = full.trim();
    if full.is_empty() {
        player.name.clone()
    } else {
        full.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ApiFixtureItem {
    fixture: ApiFixture,
    #[serde(default)]
    league: ApiFixtureLeague,
    teams: ApiFixtureTeams,
    #[serde(default)]
    goals: ApiFixtureGoals,
}

#[derive(Debug, Deserialize)]
struct ApiFixture {
    id: u64,
    #[serde(default, deserialize_with = "string_or_default")]
    date: String,
}

#[derive(Debug, Deserialize, Default)]
struct ApiFixtureLeague {
    #[serde(default, deserialize_with = "string_or_default")]
    logo: String,
    #[serde(default, deserialize_with = "string_or_default")]
    round: String,
}

#[derive(Debug, Deserialize)]
struct ApiFixtureTeams {
    home: ApiTeam,
    away: ApiTeam,
}

#[derive(Debug, Deserialize, Default)]
struct ApiFixtureGoals {
    #[serde(default)]
    home: Option<u32>,
    #[serde(default)]
    away: Option<u32>,
}

/// Fixtures grouped by round, rounds in the order they first appear.
pub fn parse_fixtures_json(raw: &str) -> Result<Vec<MatchdayGroup>> {
    let items: Vec<ApiFixtureItem> = parse_envelope(raw, "fixtures")?;
    let mut groups: Vec<MatchdayGroup> = Vec::new();
    for item in items {
        let row = FixtureRow {
            fixture_id: item.fixture.id,
            kickoff: format_kickoff(&item.fixture.date),
            home: item.teams.home.name,
            home_logo: item.teams.home.logo,
            home_goals: item.goals.home,
            away: item.teams.away.name,
            away_logo: item.teams.away.logo,
            away_goals: item.goals.away,
            league_logo: item.league.logo,
        };
        match groups.iter_mut().find(|g| g.round == item.league.round) {
            Some(group) => group.fixtures.push(row),
            None => groups.push(MatchdayGroup {
                round: item.league.round,
                fixtures: vec![row],
            }),
        }
    }
    Ok(groups)
}

/// "2023-08-11T19:00:00+00:00" -> "2023-08-11 - 19:00" (UTC).
pub fn format_kickoff(raw: &str) -> String {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return "TBD".to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return dt.with_timezone(&Utc).format("%Y-%m-%d - %H:%M").to_string();
    }
    if cleaned.len() >= 16 && cleaned.is_char_boundary(16) {
        return cleaned[..16].replacen('T', " - ", 1);
    }
    cleaned.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLineupItem {
    #[serde(default)]
    team: ApiTeam,
    #[serde(default)]
    coach: ApiCoach,
    #[serde(default)]
    formation: Option<String>,
    #[serde(rename = "startXI", default)]
    start_xi: Vec<ApiLineupEntry>,
    #[serde(default)]
    substitutes: Vec<ApiLineupEntry>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiCoach {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiLineupEntry {
    player: ApiLineupPlayer,
}

#[derive(Debug, Deserialize)]
struct ApiLineupPlayer {
    #[serde(default, deserialize_with = "string_or_default")]
    name: String,
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    grid: Option<String>,
}

impl From<ApiLineupEntry> for LineupPlayer {
    fn from(entry: ApiLineupEntry) -> Self {
        Self {
            name: entry.player.name,
            number: entry.player.number,
            grid: entry.player.grid,
        }
    }
}

pub fn parse_lineups_json(raw: &str) -> Result<Vec<TeamLineup>> {
    let items: Vec<ApiLineupItem> = parse_envelope(raw, "lineups")?;
    Ok(items
        .into_iter()
        .map(|item| TeamLineup {
            team_name: item.team.name,
            team_logo: item.team.logo,
            formation: item.formation.unwrap_or_default(),
            coach: item.coach.name.unwrap_or_default(),
            start_xi: item.start_xi.into_iter().map(LineupPlayer::from).collect(),
            substitutes: item.substitutes.into_iter().map(LineupPlayer::from).collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::format_kickoff;

    #[test]
    fn kickoff_formats_in_utc() {
        assert_eq!(format_kickoff("2023-08-11T19:00:00+00:00"), "2023-08-11 - 19:00");
        assert_eq!(format_kickoff("2023-08-12T16:30:00+02:00"), "2023-08-12 - 14:30");
        assert_eq!(format_kickoff(""), "TBD");
        assert_eq!(format_kickoff("2023-08-11T19:00"), "2023-08-11 - 19:00");
    }
}

use anyhow::Result;

use crate::error::LensError;
use crate::kv_store::KeyValueStore;
use crate::season::{self, LATEST_SEASON};

const KEY_LEAGUE_ID: &str = "selectedLeagueId";
const KEY_LEAGUE_NAME: &str = "selectedLeagueName";
const KEY_LEAGUE_LOGO: &str = "selectedLeagueLogo";
const KEY_COUNTRY_NAME: &str = "selectedCountryName";
const KEY_SEASON: &str = "selectedSeason";
const KEY_FIXTURE: &str = "selectedFixture";

/// The league a detail page works on, as written by the league list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedLeagueContext {
    pub league_id: u32,
    pub league_name: String,
    pub league_logo: String,
    pub country_name: String,
    pub season: String,
}

impl SelectedLeagueContext {
    /// "Premier League (England) - Season: 2023/2024"
    pub fn header(&self) -> String {
        let season = season::parse_season(&self.season).unwrap_or(LATEST_SEASON);
        format!(
            "{} ({}) - Season: {}",
            self.league_name,
            self.country_name,
            season::season_label(season)
        )
    }
}

pub fn save_league<S: KeyValueStore>(
    store: &mut S,
    league_id: u32,
    league_name: &str,
    league_logo: &str,
    country_name: &str,
) -> Result<()> {
    store.set_many(&[
        (KEY_LEAGUE_ID, league_id.to_string()),
        (KEY_LEAGUE_NAME, league_name.to_string()),
        (KEY_LEAGUE_LOGO, league_logo.to_string()),
        (KEY_COUNTRY_NAME, country_name.to_string()),
    ])
}

pub fn load_league<S: KeyValueStore>(store: &S) -> Result<SelectedLeagueContext, LensError> {
    let league_id = store
        .get(KEY_LEAGUE_ID)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .ok_or(LensError::MissingContext { what: "league" })?;
    Ok(SelectedLeagueContext {
        league_id,
        league_name: store.get(KEY_LEAGUE_NAME).unwrap_or_default(),
        league_logo: store.get(KEY_LEAGUE_LOGO).unwrap_or_default(),
        country_name: store.get(KEY_COUNTRY_NAME).unwrap_or_default(),
        season: load_season(store),
    })
}

/// The stored season, or the latest one when it is missing or outside the
/// offered range.
pub fn load_season<S: KeyValueStore>(store: &S) -> String {
    store
        .get(KEY_SEASON)
        .and_then(|raw| season::parse_season(&raw))
        .unwrap_or(LATEST_SEASON)
        .to_string()
}

pub fn save_season<S: KeyValueStore>(store: &mut S, season: u16) -> Result<()> {
    store.set(KEY_SEASON, season.to_string())
}

pub fn save_fixture<S: KeyValueStore>(store: &mut S, fixture_id: u64) -> Result<()> {
    store.set(KEY_FIXTURE, fixture_id.to_string())
}

pub fn load_fixture<S: KeyValueStore>(store: &S) -> Result<u64, LensError> {
    store
        .get(KEY_FIXTURE)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .ok_or(LensError::MissingContext { what: "fixture" })
}

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::context::{self, SelectedLeagueContext};
use crate::error::LensError;
use crate::favorites::{AddOutcome, FavoriteLeague, FavoritesRepository};
use crate::kv_store::KeyValueStore;
use crate::page::Page;
use crate::season::SeasonSelector;

pub const SEARCH_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueRow {
    pub league_id: u32,
    pub name: String,
    pub league_type: String,
    pub logo: String,
    pub country: String,
}

impl From<&FavoriteLeague> for LeagueRow {
    fn from(fav: &FavoriteLeague) -> Self {
        Self {
            league_id: fav.league_id,
            name: fav.league_name.clone(),
            league_type: fav.league_type.clone(),
            logo: fav.league_logo.clone(),
            country: fav.country_name.clone(),
        }
    }
}

/// A league row together with its favorite checkbox state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueListRow {
    pub league: LeagueRow,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    pub rank: u32,
    pub team: String,
    pub logo: String,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub lose: u32,
    pub points: i32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatRow {
    pub rank: usize,
    pub name: String,
    pub photo: String,
    pub team: String,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRow {
    pub fixture_id: u64,
    pub kickoff: String,
    pub home: String,
    pub home_logo: String,
    pub home_goals: Option<u32>,
    pub away: String,
    pub away_logo: String,
    pub away_goals: Option<u32>,
    pub league_logo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchdayGroup {
    pub round: String,
    pub fixtures: Vec<FixtureRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupPlayer {
    pub name: String,
    pub number: Option<u32>,
    /// "column:row"; substitutes have none.
    pub grid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLineup {
    pub team_name: String,
    pub team_logo: String,
    pub formation: String,
    pub coach: String,
    pub start_xi: Vec<LineupPlayer>,
    pub substitutes: Vec<LineupPlayer>,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetLeagues(Vec<LeagueRow>),
    SetSearchResults {
        query: String,
        leagues: Vec<LeagueRow>,
    },
    SetStandings(Vec<StandingRow>),
    SetTopScorers(Vec<PlayerStatRow>),
    SetTopAssists(Vec<PlayerStatRow>),
    SetFixtures(Vec<MatchdayGroup>),
    SetLineups {
        fixture_id: u64,
        teams: Vec<TeamLineup>,
    },
    /// A fetch ended without data; the previous view stays on screen.
    LoadFailed(String),
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchLeagues,
    SearchLeagues { query: String },
    FetchStandings { league_id: u32, season: String },
    FetchTopScorers { league_id: u32, season: String },
    FetchTopAssists { league_id: u32, season: String },
    FetchFixtures { league_id: u32, season: String },
    FetchLineups { fixture_id: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub active: bool,
    pub input: String,
    pub edited_at: Option<Instant>,
    pub sent: Option<String>,
    pub results: Vec<LeagueRow>,
    pub selected: usize,
}

impl SearchState {
    pub fn clear(&mut self) {
        self.input.clear();
        self.edited_at = None;
        self.sent = None;
        self.results.clear();
        self.selected = 0;
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub page: Page,
    pub selected: usize,
    pub scroll: u16,
    pub loading: bool,
    pub leagues: Vec<LeagueRow>,
    pub favorites: Vec<FavoriteLeague>,
    pub favorites_only: bool,
    pub search: SearchState,
    pub league_context: Option<SelectedLeagueContext>,
    pub season: SeasonSelector,
    pub standings: Vec<StandingRow>,
    pub top_scorers: Vec<PlayerStatRow>,
    pub top_assists: Vec<PlayerStatRow>,
    pub fixtures: Vec<MatchdayGroup>,
    pub lineup_fixture: Option<u64>,
    pub lineups: Vec<TeamLineup>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Page::Leagues)
    }
}

impl AppState {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            selected: 0,
            scroll: 0,
            loading: false,
            leagues: Vec::new(),
            favorites: Vec::new(),
            favorites_only: false,
            search: SearchState::default(),
            league_context: None,
            season: SeasonSelector::populate(""),
            standings: Vec::new(),
            top_scorers: Vec::new(),
            top_assists: Vec::new(),
            fixtures: Vec::new(),
            lineup_fixture: None,
            lineups: Vec::new(),
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn refresh_favorites<R: FavoritesRepository>(&mut self, repo: &R) {
        self.favorites = repo.list();
        self.clamp_selection();
    }

    /// Rows for the league list: stored favorites when the filter is on,
    /// otherwise the fetched leagues with their favorite flag.
    pub fn league_rows(&self) -> Vec<LeagueListRow> {
        if self.favorites_only {
            return self
                .favorites
                .iter()
                .map(|fav| LeagueListRow {
                    league: LeagueRow::from(fav),
                    is_favorite: true,
                })
                .collect();
        }
        self.leagues
            .iter()
            .map(|league| LeagueListRow {
                league: league.clone(),
                is_favorite: self
                    .favorites
                    .iter()
                    .any(|f| f.league_id == league.league_id),
            })
            .collect()
    }

    pub fn fixture_rows(&self) -> Vec<&FixtureRow> {
        self.fixtures.iter().flat_map(|g| g.fixtures.iter()).collect()
    }

    pub fn row_count(&self) -> usize {
        match self.page {
            Page::Leagues => self.league_rows().len(),
            Page::Standings => self.standings.len(),
            Page::TopScorers => self.top_scorers.len(),
            Page::TopAssists => self.top_assists.len(),
            Page::Fixtures => self.fixture_rows().len(),
            Page::Lineup => 0,
        }
    }

    pub fn select_next(&mut self) {
        if self.search.active {
            if self.search.selected + 1 < self.search.results.len() {
                self.search.selected += 1;
            }
            return;
        }
        if self.page == Page::Lineup {
            self.scroll = self.scroll.saturating_add(1);
            return;
        }
        let total = self.row_count();
        if total > 0 && self.selected + 1 < total {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.search.active {
            self.search.selected = self.search.selected.saturating_sub(1);
            return;
        }
        if self.page == Page::Lineup {
            self.scroll = self.scroll.saturating_sub(1);
            return;
        }
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn selected_league(&self) -> Option<LeagueListRow> {
        self.league_rows().into_iter().nth(self.selected)
    }

    pub fn selected_fixture(&self) -> Option<&FixtureRow> {
        self.fixture_rows().into_iter().nth(self.selected)
    }

    pub fn toggle_favorites_only(&mut self) {
        self.favorites_only = !self.favorites_only;
        self.selected = 0;
    }

    /// Flips the favorite checkbox of the selected league row.
    pub fn toggle_selected_favorite<R: FavoritesRepository>(&mut self, repo: &mut R) -> Result<()> {
        let Some(row) = self.selected_league() else {
            return Ok(());
        };
        let make_favorite = !row.is_favorite;
        repo.set_membership(FavoriteLeague::from(&row.league), make_favorite)?;
        self.refresh_favorites(repo);
        if make_favorite {
            self.push_log(format!("[INFO] {} added to favorites", row.league.name));
        } else {
            self.push_log(format!("[INFO] {} removed from favorites", row.league.name));
        }
        Ok(())
    }

    /// Adds the highlighted search result to favorites and resets the search.
    pub fn add_selected_search_result<R: FavoritesRepository>(
        &mut self,
        repo: &mut R,
    ) -> Result<Option<AddOutcome>> {
        let Some(league) = self.search.results.get(self.search.selected).cloned() else {
            return Ok(None);
        };
        let outcome = repo.add(FavoriteLeague::from(&league))?;
        match outcome {
            AddOutcome::Added => {
                self.push_log(format!("[INFO] {} was added to favorites", league.name))
            }
            AddOutcome::AlreadyPresent => {
                let notice = LensError::DuplicateFavorite {
                    league_id: league.league_id,
                    league_name: league.name.clone(),
                };
                self.push_log(format!("[INFO] {notice}"))
            }
        }
        self.refresh_favorites(repo);
        self.search.clear();
        self.search.active = false;
        Ok(Some(outcome))
    }

    pub fn search_push(&mut self, c: char, now: Instant) {
        self.search.input.push(c);
        self.search.edited_at = Some(now);
    }

    pub fn search_pop(&mut self, now: Instant) {
        self.search.input.pop();
        self.search.edited_at = Some(now);
    }

    /// The query to send once typing has paused for `debounce`. Input under
    /// three characters clears the results instead.
    pub fn search_due(&mut self, now: Instant, debounce: Duration) -> Option<String> {
        let edited_at = self.search.edited_at?;
        if now.duration_since(edited_at) < debounce {
            return None;
        }
        self.search.edited_at = None;
        let query = self.search.input.trim().to_string();
        if query.chars().count() < SEARCH_MIN_CHARS {
            self.search.sent = None;
            self.search.results.clear();
            self.search.selected = 0;
            return None;
        }
        if self.search.sent.as_deref() == Some(query.as_str()) {
            return None;
        }
        self.search.sent = Some(query.clone());
        Some(query)
    }

    /// Switches page and builds its load command from the stored context.
    /// A missing context leaves a console notice and no command.
    pub fn open_page<S: KeyValueStore>(&mut self, page: Page, store: &S) -> Option<ProviderCommand> {
        self.page = page;
        self.selected = 0;
        self.scroll = 0;
        self.search.active = false;
        self.season = SeasonSelector::populate(&context::load_season(store));
        self.league_context = context::load_league(store).ok();

        match page.load_command(store) {
            Ok(cmd) => {
                self.loading = true;
                Some(cmd)
            }
            Err(err) => {
                self.loading = false;
                self.push_log(format!("[WARN] {} unavailable: {err}", page.title()));
                None
            }
        }
    }

    /// Writes the selected league as navigation context and opens standings.
    pub fn enter_selected_league<S: KeyValueStore>(&mut self, store: &mut S) -> Result<Option<ProviderCommand>> {
        let Some(row) = self.selected_league() else {
            return Ok(None);
        };
        let league = row.league;
        context::save_league(store, league.league_id, &league.name, &league.logo, &league.country)?;
        Ok(self.open_page(Page::Standings, store))
    }

    /// Writes the selected fixture id and opens its lineup.
    pub fn enter_selected_fixture<S: KeyValueStore>(&mut self, store: &mut S) -> Result<Option<ProviderCommand>> {
        let Some(fixture_id) = self.selected_fixture().map(|f| f.fixture_id) else {
            return Ok(None);
        };
        context::save_fixture(store, fixture_id)?;
        Ok(self.open_page(Page::Lineup, store))
    }

    /// Moves the season selector, persists the choice and reloads the page.
    pub fn step_season<S: KeyValueStore>(&mut self, older: bool, store: &mut S) -> Result<Option<ProviderCommand>> {
        if !self.page.uses_season() {
            return Ok(None);
        }
        let changed = if older {
            self.season.select_older()
        } else {
            self.season.select_newer()
        };
        if !changed {
            return Ok(None);
        }
        context::save_season(store, self.season.selected_year())?;
        Ok(self.open_page(self.page, store))
    }

    pub fn header_text(&self) -> String {
        match self.page {
            Page::Leagues => {
                let filter = if self.favorites_only { "FAVORITES" } else { "ALL" };
                format!("{} | {filter}", self.page.title())
            }
            Page::Lineup => match self.lineup_fixture {
                Some(id) => format!("{} | Fixture #{id}", self.page.title()),
                None => self.page.title().to_string(),
            },
            _ => match &self.league_context {
                Some(ctx) => format!("{} | {}", self.page.title(), ctx.header()),
                None => self.page.title().to_string(),
            },
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetLeagues(leagues) => {
            state.leagues = leagues;
            state.loading = false;
            state.clamp_selection();
        }
        Delta::SetSearchResults { query, leagues } => {
            // A result for a query the user has since edited away is dropped.
            if state.search.sent.as_deref() != Some(query.as_str()) {
                return;
            }
            state.search.results = leagues;
            state.search.selected = 0;
        }
        Delta::SetStandings(rows) => {
            state.standings = rows;
            state.loading = false;
            state.clamp_selection();
        }
        Delta::SetTopScorers(rows) => {
            state.top_scorers = rows;
            state.loading = false;
            state.clamp_selection();
        }
        Delta::SetTopAssists(rows) => {
            state.top_assists = rows;
            state.loading = false;
            state.clamp_selection();
        }
        Delta::SetFixtures(groups) => {
            state.fixtures = groups;
            state.loading = false;
            state.clamp_selection();
        }
        Delta::SetLineups { fixture_id, teams } => {
            state.lineup_fixture = Some(fixture_id);
            state.lineups = teams;
            state.loading = false;
            state.scroll = 0;
        }
        Delta::LoadFailed(msg) => {
            state.loading = false;
            state.push_log(msg);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

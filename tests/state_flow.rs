use std::time::{Duration, Instant};

use league_lens::context;
use league_lens::favorites::{AddOutcome, FavoriteLeague, FavoritesRepository, StoredFavorites};
use league_lens::kv_store::{KeyValueStore, MemoryStore};
use league_lens::page::Page;
use league_lens::state::{
    AppState, Delta, FixtureRow, LeagueRow, MatchdayGroup, ProviderCommand, apply_delta,
};

fn league_row(id: u32, name: &str, country: &str) -> LeagueRow {
    LeagueRow {
        league_id: id,
        name: name.to_string(),
        league_type: "League".to_string(),
        logo: format!("{id}.png"),
        country: country.to_string(),
    }
}

fn fixture(id: u64) -> FixtureRow {
    FixtureRow {
        fixture_id: id,
        kickoff: "2023-08-11 - 19:00".to_string(),
        home: "H".to_string(),
        home_logo: String::new(),
        home_goals: None,
        away: "A".to_string(),
        away_logo: String::new(),
        away_goals: None,
        league_logo: String::new(),
    }
}

fn loaded_leagues() -> AppState {
    let mut state = AppState::new(Page::Leagues);
    apply_delta(
        &mut state,
        Delta::SetLeagues(vec![
            league_row(39, "Premier League", "England"),
            league_row(140, "La Liga", "Spain"),
        ]),
    );
    state
}

#[test]
fn toggling_selected_league_updates_store_and_rows() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    let mut state = loaded_leagues();
    state.select_next();

    state.toggle_selected_favorite(&mut repo).unwrap();
    assert!(repo.is_favorite(140));
    let rows = state.league_rows();
    assert!(!rows[0].is_favorite);
    assert!(rows[1].is_favorite);

    state.toggle_selected_favorite(&mut repo).unwrap();
    assert!(!repo.is_favorite(140));
    assert!(state.league_rows().iter().all(|r| !r.is_favorite));
}

#[test]
fn favorites_only_lists_stored_favorites() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    repo.add(FavoriteLeague {
        league_id: 78,
        league_name: "Bundesliga".to_string(),
        league_type: "League".to_string(),
        league_logo: String::new(),
        country_name: "Germany".to_string(),
    })
    .unwrap();

    let mut state = loaded_leagues();
    state.refresh_favorites(&repo);
    state.toggle_favorites_only();

    let rows = state.league_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].league.name, "Bundesliga");
    assert!(rows[0].is_favorite);
}

#[test]
fn entering_league_writes_context_and_loads_standings() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    let mut state = loaded_leagues();

    let cmd = state.enter_selected_league(repo.store_mut()).unwrap();
    assert_eq!(
        cmd,
        Some(ProviderCommand::FetchStandings {
            league_id: 39,
            season: "2023".to_string()
        })
    );
    assert_eq!(state.page, Page::Standings);
    assert!(state.loading);
    let ctx = context::load_league(repo.store()).unwrap();
    assert_eq!(ctx.league_name, "Premier League");
    assert_eq!(ctx.country_name, "England");
    assert!(state.header_text().contains("Premier League (England) - Season: 2023/2024"));
}

#[test]
fn detail_page_without_context_logs_instead_of_fetching() {
    let store = MemoryStore::new();
    let mut state = AppState::new(Page::Leagues);
    assert_eq!(state.open_page(Page::TopScorers, &store), None);
    assert!(!state.loading);
    assert!(state.logs.back().is_some_and(|l| l.contains("no league selected")));
}

#[test]
fn season_step_persists_and_reloads() {
    let mut store = MemoryStore::new();
    context::save_league(&mut store, 39, "Premier League", "", "England").unwrap();
    let mut state = AppState::new(Page::Leagues);
    state.open_page(Page::Fixtures, &store);

    let cmd = state.step_season(true, &mut store).unwrap();
    assert_eq!(
        cmd,
        Some(ProviderCommand::FetchFixtures {
            league_id: 39,
            season: "2022".to_string()
        })
    );
    assert_eq!(context::load_season(&store), "2022");
    assert_eq!(state.season.selected_label(), "2022/2023");

    // Newest season cannot step further.
    state.step_season(false, &mut store).unwrap();
    assert_eq!(state.step_season(false, &mut store).unwrap(), None);
}

#[test]
fn stored_season_outside_selector_loads_latest() {
    let mut store = MemoryStore::new();
    context::save_league(&mut store, 39, "Premier League", "", "England").unwrap();
    store.set("selectedSeason", "1999".to_string()).unwrap();
    let mut state = AppState::new(Page::Leagues);

    let cmd = state.open_page(Page::Standings, &store);
    assert_eq!(
        cmd,
        Some(ProviderCommand::FetchStandings {
            league_id: 39,
            season: "2023".to_string()
        })
    );
    assert_eq!(state.season.selected_label(), "2023/2024");
    assert!(state.header_text().contains("Season: 2023/2024"));
}

#[test]
fn season_step_ignored_on_league_list() {
    let mut store = MemoryStore::new();
    let mut state = AppState::new(Page::Leagues);
    assert_eq!(state.step_season(true, &mut store).unwrap(), None);
}

#[test]
fn entering_fixture_opens_its_lineup() {
    let mut store = MemoryStore::new();
    let mut state = AppState::new(Page::Fixtures);
    apply_delta(
        &mut state,
        Delta::SetFixtures(vec![
            MatchdayGroup {
                round: "Regular Season - 1".to_string(),
                fixtures: vec![fixture(11), fixture(12)],
            },
            MatchdayGroup {
                round: "Regular Season - 2".to_string(),
                fixtures: vec![fixture(21)],
            },
        ]),
    );
    state.select_next();
    state.select_next();
    assert_eq!(state.selected_fixture().map(|f| f.fixture_id), Some(21));

    let cmd = state.enter_selected_fixture(&mut store).unwrap();
    assert_eq!(cmd, Some(ProviderCommand::FetchLineups { fixture_id: 21 }));
    assert_eq!(state.page, Page::Lineup);
    assert_eq!(context::load_fixture(&store).unwrap(), 21);
}

#[test]
fn short_search_is_never_sent() {
    let mut state = AppState::new(Page::Leagues);
    state.search.results = vec![league_row(1, "Old", "X")];
    let t0 = Instant::now();
    let debounce = Duration::from_millis(300);

    state.search_push('p', t0);
    state.search_push('r', t0);
    assert_eq!(state.search_due(t0 + Duration::from_secs(1), debounce), None);
    assert!(state.search.results.is_empty());
}

#[test]
fn search_waits_for_debounce_and_sends_once() {
    let mut state = AppState::new(Page::Leagues);
    let t0 = Instant::now();
    let debounce = Duration::from_millis(300);
    for c in "prem".chars() {
        state.search_push(c, t0);
    }

    assert_eq!(state.search_due(t0 + Duration::from_millis(100), debounce), None);
    assert_eq!(
        state.search_due(t0 + Duration::from_millis(300), debounce),
        Some("prem".to_string())
    );
    assert_eq!(state.search_due(t0 + Duration::from_millis(900), debounce), None);
}

#[test]
fn stale_search_results_are_dropped() {
    let mut state = AppState::new(Page::Leagues);
    let t0 = Instant::now();
    for c in "liga".chars() {
        state.search_push(c, t0);
    }
    state.search_due(t0 + Duration::from_secs(1), Duration::from_millis(300));

    apply_delta(
        &mut state,
        Delta::SetSearchResults {
            query: "lig".to_string(),
            leagues: vec![league_row(1, "Stale", "X")],
        },
    );
    assert!(state.search.results.is_empty());

    apply_delta(
        &mut state,
        Delta::SetSearchResults {
            query: "liga".to_string(),
            leagues: vec![league_row(140, "La Liga", "Spain")],
        },
    );
    assert_eq!(state.search.results.len(), 1);
}

#[test]
fn adding_search_result_notifies_on_duplicate() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    let mut state = AppState::new(Page::Leagues);

    state.search.results = vec![league_row(140, "La Liga", "Spain")];
    assert_eq!(
        state.add_selected_search_result(&mut repo).unwrap(),
        Some(AddOutcome::Added)
    );
    assert!(state.search.results.is_empty());
    assert!(state.search.input.is_empty());

    state.search.results = vec![league_row(140, "La Liga", "Spain")];
    assert_eq!(
        state.add_selected_search_result(&mut repo).unwrap(),
        Some(AddOutcome::AlreadyPresent)
    );
    assert!(state.logs.back().is_some_and(|l| l.contains("already in favorites")));
    assert_eq!(repo.list().len(), 1);
}

#[test]
fn failed_load_keeps_previous_rows() {
    let mut state = loaded_leagues();
    state.loading = true;
    apply_delta(&mut state, Delta::LoadFailed("[WARN] Leagues error: boom".to_string()));
    assert!(!state.loading);
    assert_eq!(state.leagues.len(), 2);
    assert_eq!(state.logs.back().map(String::as_str), Some("[WARN] Leagues error: boom"));
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::new(Page::Leagues);
    for i in 0..250 {
        state.push_log(format!("[INFO] {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] 50"));
}

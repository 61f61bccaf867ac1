use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;

use crate::api_football;
use crate::config::ApiConfig;
use crate::state::{Delta, ProviderCommand};

/// Runs fetch commands one at a time on a background thread. Each command
/// yields exactly one data delta or one `LoadFailed`; the thread exits when
/// either channel end is dropped.
pub fn spawn_provider(api: ApiConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        if api.api_key.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] RAPIDAPI_KEY is not set; requests will fail".to_string(),
            ));
        }
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = match run_command(&api, &cmd) {
                Ok(delta) => delta,
                Err(err) => Delta::LoadFailed(format!("[WARN] {} error: {err:#}", command_label(&cmd))),
            };
            if tx.send(delta).is_err() {
                break;
            }
        }
    });
}

pub fn run_command(api: &ApiConfig, cmd: &ProviderCommand) -> Result<Delta> {
    let delta = match cmd {
        ProviderCommand::FetchLeagues => Delta::SetLeagues(api_football::fetch_all_leagues(api)?),
        ProviderCommand::SearchLeagues { query } => Delta::SetSearchResults {
            query: query.clone(),
            leagues: api_football::search_leagues(api, query)?,
        },
        ProviderCommand::FetchStandings { league_id, season } => {
            Delta::SetStandings(api_football::fetch_standings(api, *league_id, season)?)
        }
        ProviderCommand::FetchTopScorers { league_id, season } => {
            Delta::SetTopScorers(api_football::fetch_top_scorers(api, *league_id, season)?)
        }
        ProviderCommand::FetchTopAssists { league_id, season } => {
            Delta::SetTopAssists(api_football::fetch_top_assists(api, *league_id, season)?)
        }
        ProviderCommand::FetchFixtures { league_id, season } => {
            Delta::SetFixtures(api_football::fetch_fixtures(api, *league_id, season)?)
        }
        ProviderCommand::FetchLineups { fixture_id } => Delta::SetLineups {
            fixture_id: *fixture_id,
            teams: api_football::fetch_lineups(api, *fixture_id)?,
        },
    };
    Ok(delta)
}

fn command_label(cmd: &ProviderCommand) -> &'static str {
    match cmd {
        ProviderCommand::FetchLeagues => "Leagues",
        ProviderCommand::SearchLeagues { .. } => "League search",
        ProviderCommand::FetchStandings { .. } => "Standings",
        ProviderCommand::FetchTopScorers { .. } => "Top scorers",
        ProviderCommand::FetchTopAssists { .. } => "Top assists",
        ProviderCommand::FetchFixtures { .. } => "Fixtures",
        ProviderCommand::FetchLineups { .. } => "Lineups",
    }
}

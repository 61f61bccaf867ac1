use std::fmt;
use std::str::FromStr;

use crate::context;
use crate::error::LensError;
use crate::kv_store::KeyValueStore;
use crate::state::ProviderCommand;

/// Which view is on screen. The host picks the first one at startup; every
/// page maps to exactly one load command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Leagues,
    Standings,
    TopScorers,
    TopAssists,
    Fixtures,
    Lineup,
}

pub const ALL_PAGES: [Page; 6] = [
    Page::Leagues,
    Page::Standings,
    Page::TopScorers,
    Page::TopAssists,
    Page::Fixtures,
    Page::Lineup,
];

impl Page {
    pub fn cli_name(self) -> &'static str {
        match self {
            Page::Leagues => "leagues",
            Page::Standings => "standings",
            Page::TopScorers => "top-scorers",
            Page::TopAssists => "top-assists",
            Page::Fixtures => "fixtures",
            Page::Lineup => "lineup",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Leagues => "LEAGUES",
            Page::Standings => "STANDINGS",
            Page::TopScorers => "TOP SCORERS",
            Page::TopAssists => "TOP ASSISTS",
            Page::Fixtures => "FIXTURES",
            Page::Lineup => "LINEUP",
        }
    }

    pub fn uses_season(self) -> bool {
        matches!(
            self,
            Page::Standings | Page::TopScorers | Page::TopAssists | Page::Fixtures
        )
    }

    /// The one fetch this page runs on load, built from the stored
    /// navigation context.
    pub fn load_command<S: KeyValueStore>(self, store: &S) -> Result<ProviderCommand, LensError> {
        let cmd = match self {
            Page::Leagues => ProviderCommand::FetchLeagues,
            Page::Lineup => ProviderCommand::FetchLineups {
                fixture_id: context::load_fixture(store)?,
            },
            Page::Standings | Page::TopScorers | Page::TopAssists | Page::Fixtures => {
                let ctx = context::load_league(store)?;
                let season = ctx.season.trim().to_string();
                let league_id = ctx.league_id;
                match self {
                    Page::Standings => ProviderCommand::FetchStandings { league_id, season },
                    Page::TopScorers => ProviderCommand::FetchTopScorers { league_id, season },
                    Page::TopAssists => ProviderCommand::FetchTopAssists { league_id, season },
                    _ => ProviderCommand::FetchFixtures { league_id, season },
                }
            }
        };
        Ok(cmd)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPage(pub String);

impl fmt::Display for UnknownPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = ALL_PAGES.iter().map(|p| p.cli_name()).collect();
        write!(f, "unknown page '{}' (expected one of: {})", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownPage {}

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_ascii_lowercase().replace('_', "-");
        ALL_PAGES
            .iter()
            .copied()
            .find(|p| p.cli_name() == key)
            .ok_or_else(|| UnknownPage(raw.to_string()))
    }
}

/// `--page <name>` or `--page=<name>` from the process arguments.
pub fn parse_page_arg<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--page" {
            return iter.next();
        }
        if let Some(rest) = arg.strip_prefix("--page=") {
            return Some(rest.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::MemoryStore;

    #[test]
    fn parses_cli_names() {
        for page in ALL_PAGES {
            assert_eq!(page.cli_name().parse::<Page>(), Ok(page));
        }
        assert_eq!("TOP_SCORERS".parse::<Page>(), Ok(Page::TopScorers));
        assert!("index.html".parse::<Page>().is_err());
    }

    #[test]
    fn page_arg_forms() {
        let args = ["bin", "--page", "fixtures"].map(String::from);
        assert_eq!(parse_page_arg(args).as_deref(), Some("fixtures"));
        let args = ["bin", "--page=lineup"].map(String::from);
        assert_eq!(parse_page_arg(args).as_deref(), Some("lineup"));
        assert_eq!(parse_page_arg(["bin".to_string()]), None);
    }

    #[test]
    fn load_commands_follow_context() {
        let mut store = MemoryStore::new();
        assert_eq!(
            Page::Leagues.load_command(&store).ok(),
            Some(ProviderCommand::FetchLeagues)
        );
        assert!(Page::Standings.load_command(&store).is_err());

        context::save_league(&mut store, 78, "Bundesliga", "", "Germany").unwrap();
        context::save_season(&mut store, 2020).unwrap();
        assert_eq!(
            Page::TopAssists.load_command(&store).ok(),
            Some(ProviderCommand::FetchTopAssists {
                league_id: 78,
                season: "2020".to_string()
            })
        );

        context::save_fixture(&mut store, 1035037).unwrap();
        assert_eq!(
            Page::Lineup.load_command(&store).ok(),
            Some(ProviderCommand::FetchLineups { fixture_id: 1035037 })
        );
    }
}

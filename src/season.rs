pub const FIRST_SEASON: u16 = 2013;
pub const LATEST_SEASON: u16 = 2023;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonOption {
    pub year: u16,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonSelector {
    pub options: Vec<SeasonOption>,
    pub selected: usize,
}

impl SeasonSelector {
    /// Latest season first. An unknown or unparsable `season` selects the
    /// latest one.
    pub fn populate(season: &str) -> Self {
        let options: Vec<SeasonOption> = (FIRST_SEASON..=LATEST_SEASON)
            .rev()
            .map(|year| SeasonOption {
                year,
                label: season_label(year),
            })
            .collect();
        let wanted = parse_season(season).unwrap_or(LATEST_SEASON);
        let selected = options.iter().position(|o| o.year == wanted).unwrap_or(0);
        Self { options, selected }
    }

    pub fn selected_year(&self) -> u16 {
        self.options
            .get(self.selected)
            .map(|o| o.year)
            .unwrap_or(LATEST_SEASON)
    }

    pub fn selected_label(&self) -> String {
        season_label(self.selected_year())
    }

    /// Moves toward older seasons. Returns true if the selection changed.
    pub fn select_older(&mut self) -> bool {
        if self.selected + 1 < self.options.len() {
            self.selected += 1;
            return true;
        }
        false
    }

    pub fn select_newer(&mut self) -> bool {
        if self.selected > 0 {
            self.selected -= 1;
            return true;
        }
        false
    }
}

pub fn season_label(year: u16) -> String {
    format!("{}/{}", year, year + 1)
}

pub fn parse_season(raw: &str) -> Option<u16> {
    let year = raw.trim().parse::<u16>().ok()?;
    (FIRST_SEASON..=LATEST_SEASON).contains(&year).then_some(year)
}

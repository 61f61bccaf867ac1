use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::LensError;
use crate::state::LineupPlayer;

/// "column:row" as sent by the lineups endpoint. Column 1 is the goalkeeper
/// band; rows count left to right inside a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridPosition {
    pub column: u8,
    pub row: u8,
}

impl FromStr for GridPosition {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (column, row) = raw.trim().split_once(':').ok_or(())?;
        let column = column.trim().parse::<u8>().map_err(|_| ())?;
        let row = row.trim().parse::<u8>().map_err(|_| ())?;
        if column == 0 || row == 0 {
            return Err(());
        }
        Ok(Self { column, row })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSlot {
    pub number: Option<u32>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationRow {
    pub column: u8,
    pub slots: Vec<Option<GridSlot>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormationGrid {
    /// Display only; the layout comes from the grid positions.
    pub formation: Option<String>,
    pub rows: Vec<FormationRow>,
}

impl FormationGrid {
    pub fn player_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.slots.iter().filter(|s| s.is_some()).count())
            .sum()
    }
}

/// Lays the starting XI out as one row per band, forward band first and the
/// goalkeeper last. A band spans rows `1..=max row seen in it`, leaving
/// `None` for rows nobody occupies.
///
/// Any player without a well-formed position rejects the whole lineup.
pub fn build(formation: Option<&str>, start_xi: &[LineupPlayer]) -> Result<FormationGrid, LensError> {
    let mut bands: BTreeMap<u8, BTreeMap<u8, &LineupPlayer>> = BTreeMap::new();
    for player in start_xi {
        let raw = player.grid.as_deref().unwrap_or_default();
        let pos = raw
            .parse::<GridPosition>()
            .map_err(|_| LensError::InvalidGridPosition {
                player: player.name.clone(),
                raw: raw.to_string(),
            })?;
        bands.entry(pos.column).or_default().insert(pos.row, player);
    }

    let columns = bands.keys().next_back().copied().unwrap_or(0);
    let mut rows = Vec::with_capacity(columns as usize);
    for column in (1..=columns).rev() {
        let slots = match bands.get(&column) {
            Some(band) => {
                let span = band.keys().next_back().copied().unwrap_or(0);
                (1..=span)
                    .map(|row| {
                        band.get(&row).map(|p| GridSlot {
                            number: p.number,
                            name: p.name.clone(),
                        })
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        rows.push(FormationRow { column, slots });
    }

    Ok(FormationGrid {
        formation: formation
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string),
        rows,
    })
}

/// "Name (number)" per player, for the starters and substitutes lists.
pub fn roster_lines(players: &[LineupPlayer]) -> Vec<String> {
    players
        .iter()
        .map(|p| {
            let number = p
                .number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{} ({number})", p.name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::GridPosition;

    #[test]
    fn grid_position_parses() {
        assert_eq!(
            "4:2".parse::<GridPosition>(),
            Ok(GridPosition { column: 4, row: 2 })
        );
        assert_eq!(
            " 1 : 1 ".parse::<GridPosition>(),
            Ok(GridPosition { column: 1, row: 1 })
        );
    }

    #[test]
    fn grid_position_rejects_malformed() {
        assert!("42".parse::<GridPosition>().is_err());
        assert!("a:1".parse::<GridPosition>().is_err());
        assert!("1:".parse::<GridPosition>().is_err());
        assert!("0:1".parse::<GridPosition>().is_err());
        assert!("".parse::<GridPosition>().is_err());
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::kv_store::KeyValueStore;
use crate::state::LeagueRow;

pub const FAVORITES_KEY: &str = "favoriteLeagues";
const FAVORITES_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLeague {
    pub league_id: u32,
    pub league_name: String,
    #[serde(default)]
    pub league_type: String,
    #[serde(default)]
    pub league_logo: String,
    #[serde(default)]
    pub country_name: String,
}

impl From<&LeagueRow> for FavoriteLeague {
    fn from(row: &LeagueRow) -> Self {
        Self {
            league_id: row.league_id,
            league_name: row.name.clone(),
            league_type: row.league_type.clone(),
            league_logo: row.logo.clone(),
            country_name: row.country.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

pub trait FavoritesRepository {
    fn list(&self) -> Vec<FavoriteLeague>;
    fn add(&mut self, league: FavoriteLeague) -> Result<AddOutcome>;
    fn remove(&mut self, league_id: u32) -> Result<()>;

    fn is_favorite(&self, league_id: u32) -> bool {
        self.list().iter().any(|l| l.league_id == league_id)
    }

    /// Checkbox form of add/remove; applying the same value twice is a no-op.
    fn set_membership(&mut self, league: FavoriteLeague, is_favorite: bool) -> Result<()> {
        if is_favorite {
            self.add(league)?;
        } else {
            self.remove(league.league_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FavoritesDoc {
    version: u32,
    #[serde(default)]
    leagues: Vec<FavoriteLeague>,
}

/// Favorites kept as one serialized blob in a key-value store. Each mutation
/// reads the blob, edits it and writes it back whole.
#[derive(Debug, Clone)]
pub struct StoredFavorites<S> {
    store: S,
}

impl<S: KeyValueStore> StoredFavorites<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn write(&mut self, leagues: Vec<FavoriteLeague>) -> Result<()> {
        let doc = FavoritesDoc {
            version: FAVORITES_VERSION,
            leagues,
        };
        let json = serde_json::to_string(&doc)?;
        self.store.set(FAVORITES_KEY, json)
    }
}

impl<S: KeyValueStore> FavoritesRepository for StoredFavorites<S> {
    fn list(&self) -> Vec<FavoriteLeague> {
        self.store
            .get(FAVORITES_KEY)
            .map(|raw| decode_favorites(&raw))
            .unwrap_or_default()
    }

    fn add(&mut self, league: FavoriteLeague) -> Result<AddOutcome> {
        let mut leagues = self.list();
        if leagues.iter().any(|l| l.league_id == league.league_id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        leagues.push(league);
        self.write(leagues)?;
        Ok(AddOutcome::Added)
    }

    fn remove(&mut self, league_id: u32) -> Result<()> {
        let leagues = self.list();
        let before = leagues.len();
        let kept: Vec<FavoriteLeague> = leagues
            .into_iter()
            .filter(|l| l.league_id != league_id)
            .collect();
        if kept.len() == before {
            return Ok(());
        }
        self.write(kept)
    }
}

/// Accepts the versioned document and the legacy bare array. Anything else,
/// including a newer version, decodes as empty.
fn decode_favorites(raw: &str) -> Vec<FavoriteLeague> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<FavoriteLeague>>(trimmed).unwrap_or_default();
    }
    match serde_json::from_str::<FavoritesDoc>(trimmed) {
        Ok(doc) if doc.version == FAVORITES_VERSION => doc.leagues,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::decode_favorites;

    #[test]
    fn legacy_array_decodes() {
        let raw = r#"[{"leagueId":39,"leagueName":"Premier League","leagueType":"League","leagueLogo":"l.png","countryName":"England"}]"#;
        let leagues = decode_favorites(raw);
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].league_id, 39);
        assert_eq!(leagues[0].country_name, "England");
    }

    #[test]
    fn garbage_decodes_empty() {
        assert!(decode_favorites("{oops").is_empty());
        assert!(decode_favorites("null").is_empty());
        assert!(decode_favorites("").is_empty());
        assert!(decode_favorites(r#"{"version":7,"leagues":[]}"#).is_empty());
    }
}

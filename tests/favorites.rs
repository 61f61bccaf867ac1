use league_lens::favorites::{AddOutcome, FAVORITES_KEY, FavoriteLeague, FavoritesRepository, StoredFavorites};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use league_lens::error::LensError;
use league_lens::kv_store::{FileStore, KeyValueStore, MemoryStore};

fn league(id: u32, name: &str) -> FavoriteLeague {
    FavoriteLeague {
        league_id: id,
        league_name: name.to_string(),
        league_type: "League".to_string(),
        league_logo: format!("https://media.api-sports.io/football/leagues/{id}.png"),
        country_name: "England".to_string(),
    }
}

#[test]
fn duplicate_add_keeps_one_entry() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    let pl = league(39, "Premier League");
    assert_eq!(repo.add(pl.clone()).unwrap(), AddOutcome::Added);
    assert_eq!(repo.add(pl.clone()).unwrap(), AddOutcome::AlreadyPresent);

    let mut renamed = pl.clone();
    renamed.league_name = "EPL".to_string();
    assert_eq!(repo.add(renamed).unwrap(), AddOutcome::AlreadyPresent);

    let list = repo.list();
    assert_eq!(list.iter().filter(|l| l.league_id == 39).count(), 1);
    assert_eq!(list[0].league_name, "Premier League");
}

#[test]
fn remove_drops_league_and_ignores_absent() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    repo.add(league(39, "Premier League")).unwrap();
    repo.add(league(40, "Championship")).unwrap();

    repo.remove(39).unwrap();
    assert!(repo.list().iter().all(|l| l.league_id != 39));
    assert!(!repo.is_favorite(39));

    repo.remove(999).unwrap();
    assert_eq!(repo.list().len(), 1);
}

#[test]
fn list_preserves_insertion_order() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    repo.add(league(140, "La Liga")).unwrap();
    repo.add(league(39, "Premier League")).unwrap();
    repo.add(league(78, "Bundesliga")).unwrap();
    let ids: Vec<u32> = repo.list().iter().map(|l| l.league_id).collect();
    assert_eq!(ids, vec![140, 39, 78]);
}

#[test]
fn set_membership_is_idempotent() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    let l = league(61, "Ligue 1");

    repo.set_membership(l.clone(), true).unwrap();
    repo.set_membership(l.clone(), true).unwrap();
    assert!(repo.is_favorite(61));
    assert_eq!(repo.list().len(), 1);

    repo.set_membership(l.clone(), false).unwrap();
    repo.set_membership(l, false).unwrap();
    assert!(!repo.is_favorite(61));
    assert!(repo.list().is_empty());
}

#[test]
fn corrupt_or_missing_data_lists_empty() {
    let repo = StoredFavorites::new(MemoryStore::new());
    assert!(repo.list().is_empty());

    let mut store = MemoryStore::new();
    store.set(FAVORITES_KEY, "{definitely not json".to_string()).unwrap();
    let repo = StoredFavorites::new(store);
    assert!(repo.list().is_empty());
    assert!(!repo.is_favorite(39));
}

#[test]
fn corrupt_data_is_replaced_on_next_add() {
    let mut store = MemoryStore::new();
    store.set(FAVORITES_KEY, "garbage".to_string()).unwrap();
    let mut repo = StoredFavorites::new(store);
    assert_eq!(repo.add(league(39, "Premier League")).unwrap(), AddOutcome::Added);
    assert_eq!(repo.list().len(), 1);
}

#[test]
fn writes_versioned_document() {
    let mut repo = StoredFavorites::new(MemoryStore::new());
    repo.add(league(39, "Premier League")).unwrap();
    let raw = repo.store().get(FAVORITES_KEY).expect("favorites written");
    let doc: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["leagues"][0]["leagueId"], 39);
    assert_eq!(doc["leagues"][0]["countryName"], "England");
}

#[test]
fn legacy_array_is_migrated_on_write() {
    let mut store = MemoryStore::new();
    store
        .set(
            FAVORITES_KEY,
            r#"[{"leagueId":39,"leagueName":"Premier League","leagueType":"League","leagueLogo":"pl.png","countryName":"England"}]"#
                .to_string(),
        )
        .unwrap();
    let mut repo = StoredFavorites::new(store);
    assert!(repo.is_favorite(39));

    repo.add(league(140, "La Liga")).unwrap();
    let raw = repo.store().get(FAVORITES_KEY).expect("favorites written");
    assert!(raw.starts_with('{'));
    let ids: Vec<u32> = repo.list().iter().map(|l| l.league_id).collect();
    assert_eq!(ids, vec![39, 140]);
}

#[test]
fn newer_version_reads_as_empty() {
    let mut store = MemoryStore::new();
    store
        .set(FAVORITES_KEY, r#"{"version":2,"leagues":[{"leagueId":1,"leagueName":"X"}]}"#.to_string())
        .unwrap();
    let repo = StoredFavorites::new(store);
    assert!(repo.list().is_empty());
}

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("league_lens_fav_{tag}_{}_{nanos}", std::process::id()))
}

#[test]
fn failed_store_write_does_not_add_favorite() {
    let dir = scratch_dir("blocked");
    fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("plain_file");
    fs::write(&blocker, "not a directory").unwrap();

    let mut repo = StoredFavorites::new(FileStore::open(blocker.join("storage.json")));
    let err = repo.add(league(39, "Premier League")).unwrap_err();
    assert!(matches!(err.downcast_ref::<LensError>(), Some(LensError::Storage { .. })));
    assert!(!repo.is_favorite(39));
    assert!(repo.list().is_empty());

    // A later failing write must not carry the rejected league along.
    assert!(repo.store_mut().set("selectedSeason", "2020".to_string()).is_err());
    assert!(repo.store().get(FAVORITES_KEY).is_none());
    let _ = fs::remove_dir_all(dir);
}

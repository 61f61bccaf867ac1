use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LensError;

const STORE_VERSION: u32 = 1;
const STORE_DIR: &str = "league_lens";
const STORE_FILE: &str = "storage.json";

/// String-to-string store shared by every page, the terminal counterpart of
/// browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    /// Writes every pair or none of them.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, String>,
}

/// One JSON document on disk. Every `set` rewrites the whole file through a
/// temp file and a rename; reads come from the in-memory copy loaded at open.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    file: StoreFile,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Self {
        let file = load_store_file(&path);
        Self { path, file }
    }

    /// Opens the store under `data_dir`, or the default per-user location.
    pub fn open_default(data_dir: Option<&Path>) -> Option<Self> {
        let path = match data_dir {
            Some(dir) => dir.join(STORE_FILE),
            None => default_store_path()?,
        };
        Some(Self::open(path))
    }

    /// Writes `next` to disk and adopts it only once the rename succeeded.
    fn commit(&mut self, next: StoreFile) -> Result<()> {
        write_store_file(&self.path, &next)?;
        self.file = next;
        Ok(())
    }
}

fn write_store_file(path: &Path, file: &StoreFile) -> Result<()> {
    let storage_err = |err: std::io::Error| LensError::Storage {
        reason: format!("{}: {err}", path.display()),
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(storage_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(file).context("serialize storage")?;
    fs::write(&tmp, json).map_err(storage_err)?;
    fs::rename(&tmp, path).map_err(storage_err)?;
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.file.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = self.file.clone();
        next.entries.remove(key);
        self.commit(next)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let mut next = self.file.clone();
        next.version = STORE_VERSION;
        for (key, value) in entries {
            next.entries.insert((*key).to_string(), value.clone());
        }
        self.commit(next)
    }
}

fn load_store_file(path: &Path) -> StoreFile {
    let Ok(raw) = fs::read_to_string(path) else {
        return StoreFile::default();
    };
    let file = serde_json::from_str::<StoreFile>(&raw).unwrap_or_default();
    if file.version != STORE_VERSION {
        return StoreFile::default();
    }
    file
}

fn default_store_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(STORE_DIR).join(STORE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(STORE_DIR)
            .join(STORE_FILE),
    )
}

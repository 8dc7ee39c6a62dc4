//! Persistence collaborator
//!
//! A string key-value [`Persistence`] backend plus the typed
//! [`PreferenceStore`] the host uses for credentials, the location flag and
//! the two bounded lists. Lists are stored as whole JSON documents so a write
//! always replaces the previous collection entirely.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use lmap_core::prelude::*;
use lmap_core::{SavedPlace, SearchResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const API_KEY: &str = "google_maps_api_key";
pub const MAP_ID_KEY: &str = "google_maps_map_id";
pub const LOCATION_ENABLED_KEY: &str = "@maps_location_enabled";
pub const SAVED_PLACES_KEY: &str = "saved_places";
pub const SEARCH_HISTORY_KEY: &str = "search_history";

/// Most saved places kept on disk
pub const MAX_SAVED_PLACES: usize = 500;

/// Most history entries kept on disk
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// String key-value storage
pub trait Persistence: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store
// ─────────────────────────────────────────────────────────────────────────────

const LOCK_FILENAME: &str = ".store.lock";

/// One file per key under a data directory.
///
/// Writes go to a temp file that is renamed over the target while an
/// exclusive lock on `.store.lock` is held.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::storage(format!("Failed to create {:?}: {}", dir, e)))?;
        Ok(Self { dir })
    }

    /// `<data_local_dir>/light-maps/store`
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| Error::storage("Could not determine local data directory"))?;
        Ok(base.join("light-maps").join("store"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name.trim_start_matches('_')))
    }

    fn lock(&self) -> Result<std::fs::File> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILENAME))
            .map_err(|e| Error::storage(format!("Failed to open store lock: {}", e)))?;
        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("Failed to lock store: {}", e)))?;
        Ok(file)
    }
}

impl Persistence for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(format!("Failed to read {:?}: {}", path, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _lock = self.lock()?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let mut file = std::fs::File::create(&temp_path)
            .map_err(|e| Error::storage(format!("Failed to create temp file: {}", e)))?;
        file.write_all(value.as_bytes())
            .map_err(|e| Error::storage(format!("Failed to write temp file: {}", e)))?;
        file.sync_all()
            .map_err(|e| Error::storage(format!("Failed to flush temp file: {}", e)))?;
        drop(file);

        std::fs::rename(&temp_path, &path)
            .map_err(|e| Error::storage(format!("Failed to rename temp file: {}", e)))?;

        trace!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _lock = self.lock()?;

        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("Failed to remove {}: {}", key, e))),
        }
    }
}

/// In-memory storage for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::storage("memory store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| Error::storage("memory store poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| Error::storage("memory store poisoned"))?
            .remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Values restored at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredState {
    pub api_key: Option<String>,
    pub map_id: Option<String>,
    pub location_enabled: bool,
    pub saved_places: Vec<SavedPlace>,
    pub history: Vec<SearchResult>,
}

/// Typed access to the persisted preferences
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn Persistence>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn Persistence>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read everything the host needs at startup.
    ///
    /// Unreadable entries fall back to their defaults.
    pub fn load(&self) -> StoredState {
        StoredState {
            api_key: self.api_key().unwrap_or_else(|e| fallback(API_KEY, e)),
            map_id: self.map_id().unwrap_or_else(|e| fallback(MAP_ID_KEY, e)),
            location_enabled: self.location_enabled().unwrap_or_else(|e| {
                warn!("Ignoring stored {}: {}", LOCATION_ENABLED_KEY, e);
                true
            }),
            saved_places: self
                .saved_places()
                .unwrap_or_else(|e| fallback(SAVED_PLACES_KEY, e)),
            history: self
                .history()
                .unwrap_or_else(|e| fallback(SEARCH_HISTORY_KEY, e)),
        }
    }

    pub fn api_key(&self) -> Result<Option<String>> {
        self.credential(API_KEY)
    }

    pub fn set_api_key(&self, key: Option<&str>) -> Result<()> {
        self.set_credential(API_KEY, key)
    }

    pub fn map_id(&self) -> Result<Option<String>> {
        self.credential(MAP_ID_KEY)
    }

    pub fn set_map_id(&self, map_id: Option<&str>) -> Result<()> {
        self.set_credential(MAP_ID_KEY, map_id)
    }

    /// Defaults to enabled when never set
    pub fn location_enabled(&self) -> Result<bool> {
        Ok(self
            .backend
            .get(LOCATION_ENABLED_KEY)?
            .map(|v| v.trim() != "false")
            .unwrap_or(true))
    }

    pub fn set_location_enabled(&self, enabled: bool) -> Result<()> {
        self.backend
            .set(LOCATION_ENABLED_KEY, if enabled { "true" } else { "false" })
    }

    pub fn saved_places(&self) -> Result<Vec<SavedPlace>> {
        self.list(SAVED_PLACES_KEY, MAX_SAVED_PLACES)
    }

    pub fn set_saved_places(&self, places: &[SavedPlace]) -> Result<()> {
        self.set_list(SAVED_PLACES_KEY, places, MAX_SAVED_PLACES)
    }

    pub fn history(&self) -> Result<Vec<SearchResult>> {
        self.list(SEARCH_HISTORY_KEY, MAX_HISTORY_ENTRIES)
    }

    pub fn set_history(&self, history: &[SearchResult]) -> Result<()> {
        self.set_list(SEARCH_HISTORY_KEY, history, MAX_HISTORY_ENTRIES)
    }

    fn credential(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .backend
            .get(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// `None` or a blank value deletes the credential
    fn set_credential(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => self.backend.set(key, value),
            None => self.backend.remove(key),
        }
    }

    fn list<T: DeserializeOwned>(&self, key: &str, limit: usize) -> Result<Vec<T>> {
        match self.backend.get(key)? {
            Some(raw) => {
                let mut items: Vec<T> = serde_json::from_str(&raw)?;
                items.truncate(limit);
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }

    fn set_list<T: Serialize>(&self, key: &str, items: &[T], limit: usize) -> Result<()> {
        let items = &items[..items.len().min(limit)];
        let raw = serde_json::to_string(items)?;
        self.backend.set(key, &raw)
    }
}

fn fallback<T: Default>(key: &str, e: Error) -> T {
    warn!("Ignoring stored {}: {}", key, e);
    T::default()
}

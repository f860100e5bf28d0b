//! # Preference Persistence
//!
//! A tiny durable key/value store that remembers the last region filter.
//!
//! Values are stored as JSON-encoded strings under fixed keys, in a single
//! JSON object on disk (`~/.terra/preferences.json` by default). Writes use
//! atomic rename (write `.tmp`, then `rename()`).
//!
//! Persistence is best effort: every storage failure is logged and swallowed,
//! and reads fall back to defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::catalog::Region;

/// Key under which the region filter is stored.
pub const REGION_KEY: &str = "regions-select";

/// String-valued durable storage.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Storage backed by one JSON file holding every key.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable preferences {}: {}", self.path.display(), e);
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write_json(&self.path, &entries)
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json(path: &Path, data: &BTreeMap<String, String>) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Process-local storage, used when no durable location is available.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns `~/.terra/preferences.json`.
pub fn default_preferences_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".terra").join("preferences.json"))
}

/// Typed access to the stored preferences.
#[derive(Clone)]
pub struct Preferences {
    storage: Arc<dyn Storage>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// File-backed preferences at `path`, or in-memory ones if there is no path.
    pub fn open(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => {
                debug!("Preferences stored at {}", path.display());
                Self::new(Arc::new(FileStorage::new(path)))
            }
            None => {
                warn!("No preferences location available, region choice will not persist");
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    pub fn save_region(&self, region: Region) {
        let encoded = match serde_json::to_string(&region) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode region {}: {}", region, e);
                return;
            }
        };
        match self.storage.set(REGION_KEY, &encoded) {
            Ok(()) => debug!("Saved region preference: {}", region),
            Err(e) => warn!("Failed to save region preference: {}", e),
        }
    }

    /// The stored region, or `Region::All` if nothing valid is stored.
    pub fn load_region(&self) -> Region {
        let raw = match self.storage.get(REGION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Region::All,
            Err(e) => {
                warn!("Failed to read region preference: {}", e);
                return Region::All;
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring invalid stored region {:?}: {}", raw, e);
            Region::All
        })
    }
}

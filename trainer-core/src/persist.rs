//! Snapshot persistence.
//!
//! The whole [`AppState`] is written as one JSON document under a single key
//! of a [`KeyValueStore`]. Two stores ship with the crate: an in-memory map for
//! tests and a directory of `<key>.json` files for the terminal front end.
//! Explicit export/import to an arbitrary path goes through
//! [`SavedState::save_json`] and [`SavedState::load_json`].

use crate::world::AppState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current snapshot format version.
pub const SAVE_VERSION: u32 = 1;

// ============================================================================
// Key-Value Stores
// ============================================================================

/// A string-keyed store of string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// In-process store backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters other than alphanumerics, `-` and `_` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let sanitized = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();
        self.dir.join(format!("{sanitized}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// A versioned snapshot of the application state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    /// Format version for compatibility checking.
    pub version: u32,

    /// Seconds since the Unix epoch when the snapshot was taken.
    pub saved_at: String,

    pub state: AppState,
}

impl SavedState {
    pub fn new(state: AppState) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: timestamp_now(),
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, rejecting other format versions.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        let saved: Self = serde_json::from_str(content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }

    /// Write to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = self.to_json()?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }
}

/// Read the snapshot under `key`. A missing key is `Ok(None)`.
pub fn load_state<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<AppState>, PersistError> {
    match store.get(key)? {
        Some(content) => Ok(Some(SavedState::from_json(&content)?.state)),
        None => Ok(None),
    }
}

/// Write `state` as a fresh snapshot under `key`.
pub fn store_state<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    state: &AppState,
) -> Result<(), PersistError> {
    let content = SavedState::new(state.clone()).to_json()?;
    store.set(key, &content)
}

fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{Condition, StatusEffect, StatusSlot};
    use crate::testing::{sample_creature, sample_trainer};

    fn sample_state() -> AppState {
        let mut state = AppState::new();
        state.trainer = Some(sample_trainer("Ash"));
        let mut creature = sample_creature("Sparky");
        creature.apply_status(
            StatusSlot::Primary,
            StatusEffect::new(Condition::BadlyPoisoned).with_duration(3),
        );
        state.team.add(creature);
        state
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let state = sample_state();

        store_state(&mut store, "trainer-state", &state).unwrap();
        assert_eq!(store.len(), 1);

        let loaded = load_state(&store, "trainer-state").unwrap();
        assert_eq!(loaded, Some(state));
        assert_eq!(load_state(&store, "other").unwrap(), None);
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        let json = SavedState::new(sample_state()).to_json().unwrap();
        assert!(json.contains("\"savedAt\""));
        assert!(json.contains("\"primaryStatus\""));
        assert!(json.contains("\"badly-poisoned\""));
        assert!(json.contains("\"pokedollars\""));
    }

    #[test]
    fn test_version_mismatch() {
        let mut saved = SavedState::new(AppState::new());
        saved.version = SAVE_VERSION + 1;
        let json = serde_json::to_string(&saved).unwrap();

        let err = SavedState::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch { expected: 1, found: 2 }
        ));
    }

    #[test]
    fn test_corrupt_snapshot_is_json_error() {
        let mut store = MemoryStore::new();
        store.set("trainer-state", "{not json").unwrap();
        assert!(matches!(
            load_state(&store, "trainer-state"),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let path = store.path_for("../my state");
        assert_eq!(path, dir.path().join("___my_state.json"));
    }

    #[test]
    fn test_file_store_get_set_remove() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("trainer-state").unwrap(), None);
        store.set("trainer-state", "{}").unwrap();
        assert_eq!(store.get("trainer-state").unwrap().as_deref(), Some("{}"));

        store.remove("trainer-state").unwrap();
        store.remove("trainer-state").unwrap();
        assert_eq!(store.get("trainer-state").unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_and_load_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        let state = sample_state();

        SavedState::new(state.clone()).save_json(&path).await.unwrap();
        let loaded = SavedState::load_json(&path).await.unwrap();

        assert_eq!(loaded.version, SAVE_VERSION);
        assert_eq!(loaded.state, state);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = SavedState::load_json(dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(PersistError::Io(_))));
    }
}

//! Persistence backends for calibration state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreError;

use super::CalibrationState;

/// Where a calibrator keeps its learned pressure range between sessions.
pub trait CalibrationStore: Send {
    /// Load the stored state; `Ok(None)` means nothing was stored yet (first run).
    fn load(&self) -> Result<Option<CalibrationState>, StoreError>;

    /// Persist the state, replacing whatever was stored.
    fn save(&mut self, state: &CalibrationState) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same slot, so a collaborator can keep a
/// handle and read back what the calibrator saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    state: Option<CalibrationState>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: CalibrationState) -> Self {
        let store = Self::default();
        store.slot().state = Some(state);
        store
    }

    fn slot(&self) -> MutexGuard<'_, MemorySlot> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> Option<CalibrationState> {
        self.slot().state
    }

    /// Number of successful `save` calls across all clones
    pub fn save_count(&self) -> usize {
        self.slot().saves
    }
}

impl CalibrationStore for MemoryStore {
    fn load(&self) -> Result<Option<CalibrationState>, StoreError> {
        Ok(self.slot().state)
    }

    fn save(&mut self, state: &CalibrationState) -> Result<(), StoreError> {
        let mut slot = self.slot();
        slot.state = Some(*state);
        slot.saves += 1;
        Ok(())
    }
}

/// JSON file store. A missing file reads as first run.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalibrationStore for JsonFileStore {
    fn load(&self) -> Result<Option<CalibrationState>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, state: &CalibrationState) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(state)?;
        // Readers never observe a partially written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("slate-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);

        let mut handle = store.clone();
        let state = CalibrationState::new(0.1, 0.8);
        handle.save(&state).unwrap();

        // clones share the slot
        assert_eq!(store.load().unwrap(), Some(state));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_json_store_missing_file_is_first_run() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_json_store_round_trip() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(&path);
        let state = CalibrationState::new(0.25, 0.75);

        store.save(&state).unwrap();
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), Some(state));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(StoreError::Json(_))));

        let _ = fs::remove_file(&path);
    }
}

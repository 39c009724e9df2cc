// # History Backends
//
// Slot-addressed string storage behind the diary. A slot is a fixed name under which
// one serialized document lives.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{StudyError, StudyResult};

/// Persistence for the diary.
pub trait HistoryBackend: Send + Sync {
    /// Read the document in `slot`, `None` when nothing was stored yet.
    fn load(&self, slot: &str) -> StudyResult<Option<String>>;

    /// Replace the document in `slot`.
    fn store(&self, slot: &str, data: &str) -> StudyResult<()>;

    /// Delete `slot`. Deleting an absent slot succeeds.
    fn remove(&self, slot: &str) -> StudyResult<()>;
}

/// One `<slot>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slot))
    }
}

impl HistoryBackend for FileBackend {
    fn load(&self, slot: &str) -> StudyResult<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StudyError::io("load history", e)),
        }
    }

    fn store(&self, slot: &str, data: &str) -> StudyResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StudyError::io("create history directory", e))?;

        // Readers only ever see a complete document
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| StudyError::io("write history", e))?;
        fs::rename(&tmp, &path).map_err(|e| StudyError::io("replace history", e))?;
        debug!(path = %path.display(), bytes = data.len(), "history stored");
        Ok(())
    }

    fn remove(&self, slot: &str) -> StudyResult<()> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StudyError::io("remove history", e)),
        }
    }
}

/// In-process backend. Clones share the same slots, so a store can be "reopened".
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<R>(&self, slot: &str, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> StudyResult<R> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StudyError::storage(slot, "memory backend lock poisoned"))?;
        Ok(f(&mut slots))
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self, slot: &str) -> StudyResult<Option<String>> {
        self.with_slots(slot, |slots| slots.get(slot).cloned())
    }

    fn store(&self, slot: &str, data: &str) -> StudyResult<()> {
        self.with_slots(slot, |slots| {
            slots.insert(slot.to_string(), data.to_string());
        })
    }

    fn remove(&self, slot: &str) -> StudyResult<()> {
        self.with_slots(slot, |slots| {
            slots.remove(slot);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &dyn HistoryBackend) {
        assert_eq!(backend.load("slot").unwrap(), None);
        backend.store("slot", "[1]").unwrap();
        backend.store("slot", "[2]").unwrap();
        assert_eq!(backend.load("slot").unwrap().as_deref(), Some("[2]"));
        backend.remove("slot").unwrap();
        backend.remove("slot").unwrap();
        assert_eq!(backend.load("slot").unwrap(), None);
    }

    #[test]
    fn memory_backend_slots() {
        exercise(&MemoryBackend::new());
    }

    #[test]
    fn file_backend_slots() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));
        exercise(&backend);
        assert!(!backend.slot_path("slot").with_extension("json.tmp").exists());
    }
}

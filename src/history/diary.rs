// # Diary Store
//
// Most-recent-first log of solved questions, capped and persisted as one JSON array
// under a fixed slot. Every mutation is written through to the backend.

use tracing::{debug, info, warn};

use crate::core::RecentLog;
use crate::error::{StudyError, StudyResult};
use crate::history::backend::HistoryBackend;
use crate::model::DiaryEntry;

/// Slot the diary is stored under.
pub const DIARY_SLOT: &str = "symbiotic_diary";
pub const DIARY_CAPACITY: usize = 20;

/// Persisted diary of past analyses.
pub struct DiaryStore {
    backend: Box<dyn HistoryBackend>,
    log: RecentLog<DiaryEntry>,
}

impl DiaryStore {
    /// Open the diary with the default capacity.
    pub fn open(backend: Box<dyn HistoryBackend>) -> StudyResult<Self> {
        Self::open_with_capacity(backend, DIARY_CAPACITY)
    }

    /// Open the diary, loading whatever the backend holds.
    ///
    /// A stored document that does not parse is logged and treated as empty; it is
    /// overwritten by the next recorded entry. Backend read failures are returned.
    pub fn open_with_capacity(backend: Box<dyn HistoryBackend>, capacity: usize) -> StudyResult<Self> {
        let entries = match backend.load(DIARY_SLOT)? {
            Some(data) => match serde_json::from_str::<Vec<DiaryEntry>>(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable diary in slot '{}': {}", DIARY_SLOT, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        debug!(entries = entries.len(), capacity, "diary opened");
        Ok(Self {
            backend,
            log: RecentLog::from_newest_first(entries, capacity),
        })
    }

    /// Add `entry` as the newest record and persist. The oldest record is dropped
    /// once the diary is full.
    ///
    /// Nothing changes in memory unless the backend write succeeds.
    pub fn record(&mut self, entry: DiaryEntry) -> StudyResult<()> {
        let mut next = self.log.clone();
        let evicted = next.push(entry);
        Self::persist(self.backend.as_ref(), &mut next)?;

        if let Some(evicted) = evicted {
            debug!("diary full, dropped entry from {}", evicted.date);
        }
        self.log = next;
        Ok(())
    }

    /// Remove every entry. Does nothing unless `confirmed` is set.
    ///
    /// Returns whether the diary was cleared.
    pub fn clear(&mut self, confirmed: bool) -> StudyResult<bool> {
        if !confirmed {
            return Ok(false);
        }
        self.backend.remove(DIARY_SLOT)?;
        self.log.clear();
        info!("  Diary cleared");
        Ok(true)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &DiaryEntry> {
        self.log.iter()
    }

    pub fn get(&self, index: usize) -> Option<&DiaryEntry> {
        self.log.get(index)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.log.capacity()
    }

    fn persist(backend: &dyn HistoryBackend, log: &mut RecentLog<DiaryEntry>) -> StudyResult<()> {
        let data = serde_json::to_string(log.as_slice())
            .map_err(|e| StudyError::storage(DIARY_SLOT, e.to_string()))?;
        backend.store(DIARY_SLOT, &data)
    }
}

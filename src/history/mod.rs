//! # History Module
//!
//! The diary: a capped, newest-first record of past analyses, persisted through an
//! injected [`HistoryBackend`] rather than process-global storage.

pub mod backend;
pub mod diary;

pub use backend::{FileBackend, HistoryBackend, MemoryBackend};
pub use diary::{DIARY_CAPACITY, DIARY_SLOT, DiaryStore};

//! Diary capacity, ordering and persistence.

use symbiotic_study::history::{DIARY_CAPACITY, DIARY_SLOT, DiaryStore, FileBackend, HistoryBackend, MemoryBackend};
use symbiotic_study::{AnalysisResponse, DiaryEntry, Subject};

fn entry(n: usize) -> DiaryEntry {
    DiaryEntry::new(Subject::Math, format!("question {n}"), None, AnalysisResponse::default())
}

#[test]
fn full_diary_drops_the_oldest_and_puts_new_first() {
    let mut diary = DiaryStore::open(Box::new(MemoryBackend::new())).unwrap();
    for n in 0..DIARY_CAPACITY {
        diary.record(entry(n)).unwrap();
    }
    assert_eq!(diary.len(), 20);
    assert_eq!(diary.get(19).unwrap().input, "question 0");

    diary.record(entry(20)).unwrap();

    assert_eq!(diary.len(), 20);
    assert_eq!(diary.get(0).unwrap().input, "question 20");
    assert!(diary.entries().all(|e| e.input != "question 0"));
    assert_eq!(diary.get(19).unwrap().input, "question 1");
}

#[test]
fn file_backed_diary_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut diary = DiaryStore::open(Box::new(FileBackend::new(dir.path()))).unwrap();
        diary.record(entry(1)).unwrap();
        diary
            .record(DiaryEntry::new(
                Subject::Chemistry,
                "",
                Some("data:image/jpeg;base64,/9j/".to_string()),
                AnalysisResponse::default(),
            ))
            .unwrap();
    }

    let backend = FileBackend::new(dir.path());
    assert!(backend.slot_path(DIARY_SLOT).exists());

    let diary = DiaryStore::open(Box::new(backend)).unwrap();
    assert_eq!(diary.len(), 2);
    let newest = diary.get(0).unwrap();
    assert_eq!(newest.subject, Subject::Chemistry);
    assert!(newest.image.is_some());
    assert_eq!(diary.get(1).unwrap().input, "question 1");
}

#[test]
fn stored_document_is_a_newest_first_json_array() {
    let backend = MemoryBackend::new();
    let mut diary = DiaryStore::open(Box::new(backend.clone())).unwrap();
    diary.record(entry(1)).unwrap();
    diary.record(entry(2)).unwrap();

    let raw = backend.load(DIARY_SLOT).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let inputs: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["input"].as_str().unwrap())
        .collect();
    assert_eq!(inputs, vec!["question 2", "question 1"]);
    assert_eq!(value[0]["subject"], "Toán học");
}

#[test]
fn oversized_stored_diary_is_trimmed_on_open() {
    let backend = MemoryBackend::new();
    let entries: Vec<DiaryEntry> = (0..30).map(entry).collect();
    backend
        .store(DIARY_SLOT, &serde_json::to_string(&entries).unwrap())
        .unwrap();

    let diary = DiaryStore::open(Box::new(backend)).unwrap();
    assert_eq!(diary.len(), DIARY_CAPACITY);
    assert_eq!(diary.get(0).unwrap().input, "question 0");
}

#[test]
fn clear_removes_the_slot_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut diary = DiaryStore::open(Box::new(FileBackend::new(dir.path()))).unwrap();
    diary.record(entry(1)).unwrap();

    assert!(diary.clear(true).unwrap());

    let backend = FileBackend::new(dir.path());
    assert!(!backend.slot_path(DIARY_SLOT).exists());
    assert!(DiaryStore::open(Box::new(backend)).unwrap().is_empty());
}

// tests/store_sqlite.rs
use std::collections::BTreeMap;

use agenda_watch::{ArtifactStore, ExtractedFields, ProcessedRecord, SqliteStore, StoreError};
use chrono::{TimeZone, Utc};

fn record(url: &str) -> ProcessedRecord {
    let fields: ExtractedFields = [
        ("location".to_string(), Some("City Hall".to_string())),
        ("meeting_time".to_string(), None),
    ]
    .into_iter()
    .collect();
    let mut metadata = BTreeMap::new();
    metadata.insert("link_text".to_string(), "Council Agenda May 1, 2024".to_string());

    ProcessedRecord {
        source: "Riverton".into(),
        url: url.into(),
        date: "2024-05-01".into(),
        metadata,
        fields,
        document_sha256: Some("feedface".into()),
        processed_at: Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap(),
    }
}

#[test]
fn first_open_creates_store_file_and_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("agendas.db");
    assert!(!path.exists());

    let store = SqliteStore::open(&path).unwrap();

    assert!(path.exists());
    assert!(!store.has_seen("https://riverton.gov/agenda.pdf").unwrap());
}

#[test]
fn records_survive_reopen_and_round_trip_all_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agendas.db");
    let rec = record("https://riverton.gov/agenda.pdf");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.record(&rec).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert!(store.has_seen(&rec.url).unwrap());
    assert_eq!(store.list().unwrap(), vec![rec]);
}

#[test]
fn duplicate_url_fails_and_leaves_original_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("agendas.db")).unwrap();
    let original = record("https://riverton.gov/agenda.pdf");
    store.record(&original).unwrap();

    let mut again = original.clone();
    again.date = "2024-06-05".into();
    let err = store.record(&again).unwrap_err();

    assert!(matches!(err, StoreError::Duplicate { .. }));
    let all = store.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].date, "2024-05-01");
}

#[test]
fn empty_file_left_by_crashed_first_run_is_initialised() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agendas.db");
    std::fs::write(&path, b"").unwrap();

    let store = SqliteStore::open(&path).unwrap();
    store.record(&record("https://a.test/x.pdf")).unwrap();
    assert!(store.has_seen("https://a.test/x.pdf").unwrap());
}

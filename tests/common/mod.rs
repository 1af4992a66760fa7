// tests/common/mod.rs
// Counting test doubles for every pipeline collaborator.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agenda_watch::extract::ExtractionError;
use agenda_watch::ingest::fetch::{DocumentFetcher, FetchedDocument};
use agenda_watch::ingest::slots::Slots;
use agenda_watch::{
    ArtifactStore, DiscoveryResult, Notifier, PatternRules, Pipeline, ProcessedRecord, Source,
    SourceDiscovery, SqliteStore, StoreError, TextExtractor,
};
use anyhow::{anyhow, Result};

pub const RIVERTON_URL: &str = "https://riverton.gov/agenda.pdf";
pub const PDF_BYTES: &[u8] = b"%PDF-1.5 fake agenda bytes";
pub const AGENDA_TEXT: &str = "RIVERTON CITY COUNCIL\nRegular Meeting\nLocation: City Hall, 12 Main St\nItem 3: Budget amendment";

// ---- discovery ----

pub struct FixedDiscovery {
    result: Result<Option<DiscoveryResult>, String>,
    pub calls: AtomicUsize,
}

impl FixedDiscovery {
    pub fn found(url: Option<&str>, date: &str) -> Self {
        Self {
            result: Ok(Some(DiscoveryResult {
                url: url.map(str::to_string),
                date: date.to_string(),
                ..Default::default()
            })),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn nothing() -> Self {
        Self {
            result: Ok(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            result: Err(msg.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl SourceDiscovery for FixedDiscovery {
    async fn discover(&self) -> Result<Option<DiscoveryResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|m| anyhow!(m))
    }
}

// ---- fetch ----

pub struct FakeFetcher {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, _url: &str, dest: &Path) -> Result<FetchedDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset by peer"));
        }
        std::fs::write(dest, PDF_BYTES)?;
        Ok(FetchedDocument {
            bytes: PDF_BYTES.len() as u64,
            sha256: "feedface".to_string(),
        })
    }
}

// ---- text ----

pub struct FakeText {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub text: String,
}

impl FakeText {
    pub fn new(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            text: text.to_string(),
        }
    }
}

impl TextExtractor for FakeText {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ExtractionError::Malformed {
                path: path.to_path_buf(),
                message: "xref table not found".into(),
            });
        }
        Ok(self.text.clone())
    }
}

// ---- notify ----

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: AtomicBool,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("smtp: 421 service not available"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.into(), subject.into(), body.into()));
        Ok(())
    }
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

// ---- store ----

/// Wraps the real SQLite store and counts calls. With `forget` set, `has_seen`
/// always answers false, simulating a caller that skips the dedup gate.
pub struct CountingStore {
    pub inner: SqliteStore,
    pub has_seen_calls: AtomicUsize,
    pub record_calls: AtomicUsize,
    pub forget: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            has_seen_calls: AtomicUsize::new(0),
            record_calls: AtomicUsize::new(0),
            forget: AtomicBool::new(false),
        }
    }
}

impl ArtifactStore for CountingStore {
    fn has_seen(&self, url: &str) -> Result<bool, StoreError> {
        self.has_seen_calls.fetch_add(1, Ordering::SeqCst);
        if self.forget.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.inner.has_seen(url)
    }

    fn record(&self, rec: &ProcessedRecord) -> Result<(), StoreError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.record(rec)
    }

    fn list(&self) -> Result<Vec<ProcessedRecord>, StoreError> {
        self.inner.list()
    }
}

// ---- harness ----

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub store: Arc<CountingStore>,
    pub fetcher: Arc<FakeFetcher>,
    pub text: Arc<FakeText>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            store: Arc::new(CountingStore::new()),
            fetcher: Arc::new(FakeFetcher::new()),
            text: Arc::new(FakeText::new(AGENDA_TEXT)),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn files_dir(&self) -> PathBuf {
        self.dir.path().join("files")
    }

    pub fn slots(&self) -> Slots {
        Slots::new(self.files_dir())
    }

    pub fn pipeline(&self, keep_files: bool) -> Pipeline {
        Pipeline::new(
            self.store.clone(),
            self.notifier.clone(),
            "clerk-watch@example.org",
            self.slots(),
        )
        .with_fetcher(self.fetcher.clone())
        .with_text_extractor(self.text.clone())
        .keep_files(keep_files)
    }
}

pub fn riverton_rules() -> PatternRules {
    PatternRules::from_patterns([
        ("location", r"(?i)location:\s*([^\n]+)"),
        ("meeting_time", r"(?i)(\d{1,2}:\d{2}\s*[ap]\.?m\.?)"),
    ])
    .unwrap()
}

pub fn source(name: &str, discovery: Arc<FixedDiscovery>) -> Source {
    Source::new(name, discovery, riverton_rules())
}

pub fn calls(c: &AtomicUsize) -> usize {
    c.load(Ordering::SeqCst)
}

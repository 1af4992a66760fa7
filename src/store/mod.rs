// src/store/mod.rs
//! Durable record of agendas that have already been processed.
//!
//! The document URL is the dedup key: once a record for a URL exists it is
//! never updated, removed, or recorded again.

pub mod sqlite;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::ExtractedFields;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record for this URL already exists.
    #[error("agenda already recorded: {url}")]
    Duplicate { url: String },

    #[error("store file was written by a newer version (schema {found}, supported {supported})")]
    UnsupportedSchema { found: i64, supported: i64 },

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding record column: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store I/O at {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// One fully processed agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub source: String,
    pub url: String,
    pub date: String,
    pub metadata: BTreeMap<String, String>,
    pub fields: ExtractedFields,
    pub document_sha256: Option<String>,
    pub processed_at: DateTime<Utc>,
}

/// Append-only, keyed by URL.
pub trait ArtifactStore: Send + Sync {
    fn has_seen(&self, url: &str) -> Result<bool, StoreError>;

    /// Insert `rec`. Must fail with [`StoreError::Duplicate`] rather than
    /// overwrite when `rec.url` is already present.
    fn record(&self, rec: &ProcessedRecord) -> Result<(), StoreError>;

    /// All records, oldest first.
    fn list(&self) -> Result<Vec<ProcessedRecord>, StoreError>;
}

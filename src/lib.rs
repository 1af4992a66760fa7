// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod extract;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::extract::{extract_fields, ExtractedFields, PatternRules, TextExtractor};
pub use crate::ingest::types::{DiscoveryResult, Source, SourceDiscovery};
pub use crate::ingest::{run_sources, Outcome, Pipeline, SourceRegistry, Stage};
pub use crate::notify::Notifier;
pub use crate::store::{ArtifactStore, ProcessedRecord, SqliteStore, StoreError};

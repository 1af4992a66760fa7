// src/ingest/pipeline.rs
//! One source, start to finish: discover, dedupe, fetch, extract text,
//! extract fields, notify, persist, clean up.
//!
//! The store's URL set is the only idempotency gate and it is consulted before
//! anything is downloaded. The message goes out before the record is written:
//! a crash or store failure between the two means the next run notifies again,
//! but a recorded agenda has always been notified. Failures before the commit
//! leave the slot files in place for inspection; the next run overwrites them.

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;

use crate::extract::{extract_fields, PdfTextExtractor, TextExtractor};
use crate::ingest::fetch::{DocumentFetcher, HttpFetcher};
use crate::ingest::slots::{SlotKind, Slots};
use crate::ingest::types::Source;
use crate::notify::{render_message, Notifier};
use crate::store::{ArtifactStore, ProcessedRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Discover,
    Dedupe,
    Fetch,
    Extract,
    Notify,
    Persist,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::Dedupe => "dedupe",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Notify => "notify",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one pipeline run.
#[derive(Debug)]
pub enum Outcome {
    /// Discovery found nothing, or found something without a link.
    NoNewArtifact,
    /// The link is already in the store; nothing was fetched or sent.
    AlreadyProcessed { url: String },
    Completed(ProcessedRecord),
    Failed { stage: Stage, cause: anyhow::Error },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::NoNewArtifact => "no_new_artifact",
            Outcome::AlreadyProcessed { .. } => "already_processed",
            Outcome::Completed(_) => "completed",
            Outcome::Failed { .. } => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoNewArtifact => f.write_str("nothing new"),
            Outcome::AlreadyProcessed { url } => write!(f, "already processed ({url})"),
            Outcome::Completed(rec) => write!(f, "processed {} meeting ({})", rec.date, rec.url),
            Outcome::Failed { stage, cause } => write!(f, "failed at {stage}: {cause:#}"),
        }
    }
}

struct StageError {
    stage: Stage,
    cause: anyhow::Error,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageError>;
}

impl<T, E: Into<anyhow::Error>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError {
            stage,
            cause: e.into(),
        })
    }
}

pub struct Pipeline {
    store: Arc<dyn ArtifactStore>,
    fetcher: Arc<dyn DocumentFetcher>,
    text_extractor: Arc<dyn TextExtractor>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
    slots: Slots,
    keep_files: bool,
}

impl Pipeline {
    /// HTTP fetching and PDF text extraction by default; swap either with the
    /// `with_*` builders.
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn Notifier>,
        recipient: impl Into<String>,
        slots: Slots,
    ) -> Self {
        Self {
            store,
            fetcher: Arc::new(HttpFetcher::new()),
            text_extractor: Arc::new(PdfTextExtractor),
            notifier,
            recipient: recipient.into(),
            slots,
            keep_files: false,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text_extractor = extractor;
        self
    }

    /// Keep the document and text slots after a successful run.
    pub fn keep_files(mut self, keep: bool) -> Self {
        self.keep_files = keep;
        self
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub async fn run(&self, source: &Source) -> Outcome {
        match self.drive(source).await {
            Ok(outcome) => outcome,
            Err(StageError { stage, cause }) => Outcome::Failed { stage, cause },
        }
    }

    async fn drive(&self, source: &Source) -> Result<Outcome, StageError> {
        let name = source.name.as_str();
        tracing::info!(target: "ingest", source = name, "checking for a new agenda");

        // 1) discover
        let Some(found) = source.discovery.discover().await.at(Stage::Discover)? else {
            tracing::info!(target: "ingest", source = name, "no meeting found");
            return Ok(Outcome::NoNewArtifact);
        };
        let Some(url) = found.identifier().map(str::to_owned) else {
            tracing::info!(target: "ingest", source = name, "no link found");
            return Ok(Outcome::NoNewArtifact);
        };

        // 2) dedupe, before any download
        if self.store.has_seen(&url).at(Stage::Dedupe)? {
            tracing::info!(target: "ingest", source = name, %url, "link already processed");
            return Ok(Outcome::AlreadyProcessed { url });
        }

        // 3) fetch
        tracing::info!(target: "ingest", source = name, %url, "new link, downloading");
        tokio::fs::create_dir_all(self.slots.dir())
            .await
            .at(Stage::Fetch)?;
        // a leftover text slot would describe the previous document
        self.slots.remove(name, SlotKind::Text).at(Stage::Fetch)?;
        let doc_path = self.slots.slot_for(name, SlotKind::Document);
        let fetched = self.fetcher.fetch(&url, &doc_path).await.at(Stage::Fetch)?;
        tracing::info!(
            target: "ingest",
            source = name,
            bytes = fetched.bytes,
            path = %doc_path.display(),
            "document downloaded"
        );

        // 4) extract text
        let extractor = Arc::clone(&self.text_extractor);
        let p = doc_path.clone();
        let text = tokio::task::spawn_blocking(move || extractor.extract(&p))
            .await
            .map_err(|e| anyhow!("text extraction task aborted: {e}"))
            .at(Stage::Extract)?
            .at(Stage::Extract)?;
        let text_path = self.slots.slot_for(name, SlotKind::Text);
        tokio::fs::write(&text_path, &text)
            .await
            .at(Stage::Extract)?;
        tracing::info!(target: "ingest", source = name, chars = text.len(), "document read");

        // 5) extract fields; misses are absent values, never errors
        let fields = extract_fields(&source.rules, &text);
        tracing::info!(
            target: "ingest",
            source = name,
            matched = fields.matched(),
            configured = fields.len(),
            "fields extracted"
        );

        // 6) notify; on failure nothing is recorded so the next run retries
        let msg = render_message(name, &found, &fields, Some(&fetched.sha256));
        self.notifier
            .send(&self.recipient, &msg.subject, &msg.body)
            .await
            .at(Stage::Notify)?;
        tracing::info!(target: "ingest", source = name, subject = %msg.subject, "notification sent");

        // 7) persist: the commit point
        let rec = ProcessedRecord {
            source: name.to_string(),
            url,
            date: found.date.clone(),
            metadata: found.metadata.clone(),
            fields,
            document_sha256: Some(fetched.sha256),
            processed_at: Utc::now(),
        };
        self.store.record(&rec).at(Stage::Persist)?;
        tracing::info!(target: "ingest", source = name, url = %rec.url, "agenda recorded");

        // 8) cleanup; the record is committed so a failure here is only logged
        if !self.keep_files {
            if let Err(e) = self.slots.clear(name) {
                tracing::warn!(target: "ingest", source = name, error = %e, "could not remove slot files");
            }
        }

        Ok(Outcome::Completed(rec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_are_lowercase() {
        assert_eq!(Stage::Extract.to_string(), "extract");
        assert_eq!(Stage::Notify.as_str(), "notify");
    }

    #[test]
    fn failed_outcome_display_has_stage_and_cause() {
        let o = Outcome::Failed {
            stage: Stage::Fetch,
            cause: anyhow!("connection refused"),
        };
        assert_eq!(o.label(), "failed");
        assert_eq!(o.to_string(), "failed at fetch: connection refused");
    }
}

// src/ingest/slots.rs
//! Fixed per-source scratch files.
//!
//! Each source owns exactly two paths under the working directory, one for the
//! downloaded document and one for its text. Every run overwrites the same
//! paths, so a source never has more than one document on disk.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Document,
    Text,
}

impl SlotKind {
    fn extension(self) -> &'static str {
        match self {
            SlotKind::Document => "pdf",
            SlotKind::Text => "txt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slots {
    dir: PathBuf,
}

impl Slots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{source}_latest.{pdf|txt}`; path separators and other unsafe
    /// characters in the source name become `_`.
    pub fn slot_for(&self, source: &str, kind: SlotKind) -> PathBuf {
        self.dir
            .join(format!("{}_latest.{}", file_stem(source), kind.extension()))
    }

    /// Remove one slot. A slot that does not exist is fine.
    pub fn remove(&self, source: &str, kind: SlotKind) -> io::Result<()> {
        match std::fs::remove_file(self.slot_for(source, kind)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove both slots for `source`.
    pub fn clear(&self, source: &str) -> io::Result<()> {
        self.remove(source, SlotKind::Document)?;
        self.remove(source, SlotKind::Text)
    }
}

/// File-name form of a source name. Two sources with the same stem (ignoring
/// case) would share slots, so the registry rejects that.
pub(crate) fn file_stem(source: &str) -> String {
    source
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

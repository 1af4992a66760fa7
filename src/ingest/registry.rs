// src/ingest/registry.rs
use anyhow::{bail, Result};

use crate::ingest::slots::file_stem;
use crate::ingest::types::Source;

/// Configured sources in catalog order. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// Rejects empty names, and names that map to the same slot files
    /// (compared case-insensitively after file-name sanitising).
    pub fn new(sources: Vec<Source>) -> Result<Self> {
        let mut seen = std::collections::HashMap::new();
        for s in &sources {
            if s.name.trim().is_empty() {
                bail!("source with empty name");
            }
            let key = file_stem(&s.name).to_lowercase();
            if let Some(prev) = seen.insert(key, s.name.as_str()) {
                bail!("duplicate source name {:?} (clashes with {:?})", s.name, prev);
            }
        }
        Ok(Self { sources })
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Everything, or only the source named by `filter` (exact match).
    pub fn select(&self, filter: Option<&str>) -> Vec<&Source> {
        match filter {
            None => self.sources.iter().collect(),
            Some(name) => self.sources.iter().filter(|s| s.name == name).collect(),
        }
    }
}

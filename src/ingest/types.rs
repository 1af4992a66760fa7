// src/ingest/types.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use crate::extract::fields::PatternRules;

/// What a source's discovery routine found on this check.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, Default)]
pub struct DiscoveryResult {
    /// Document URL; doubles as the dedup key. `None` means "nothing new".
    pub url: Option<String>,
    pub date: String, // human label, e.g. "2024-05-01" or "May 1, 2024"
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl DiscoveryResult {
    /// The discovery identifier, if the routine actually found a document.
    /// Blank URLs count as absent.
    pub fn identifier(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// One per configured source; looked up by name, never by type.
#[async_trait::async_trait]
pub trait SourceDiscovery: Send + Sync {
    async fn discover(&self) -> Result<Option<DiscoveryResult>>;
}

/// A monitored body: its name, how to find the latest agenda, and which fields
/// to pull out of it.
#[derive(Clone)]
pub struct Source {
    pub name: String,
    pub discovery: Arc<dyn SourceDiscovery>,
    pub rules: PatternRules,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        discovery: Arc<dyn SourceDiscovery>,
        rules: PatternRules,
    ) -> Self {
        Self {
            name: name.into(),
            discovery,
            rules,
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("rules", &self.rules.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

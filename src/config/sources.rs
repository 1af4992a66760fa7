// src/config/sources.rs
//! Source catalog: which councils to watch, how to find their agendas, and
//! which fields to pull out.
//!
//! ```toml
//! [[source]]
//! name = "Riverton"
//! page_url = "https://riverton.gov/meetings"
//! link_selector = "a.agenda"
//! date_pattern = '(\w+ \d{1,2}, \d{4})'
//!
//! [source.patterns]
//! location = '(?i)location:\s*(.+)'
//! ```
//!
//! The same shape is accepted as JSON: `{"source": [{...}]}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::extract::PatternRules;
use crate::ingest::providers::HtmlLinkDiscovery;
use crate::ingest::registry::SourceRegistry;
use crate::ingest::types::Source;

use super::settings::ENV_SOURCES_PATH;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub page_url: String,
    pub link_selector: Option<String>,
    pub link_pattern: Option<String>,
    pub date_pattern: Option<String>,
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
}

fn default_kind() -> String {
    "html_link".to_string()
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "source")]
    sources: Vec<SourceEntry>,
}

/// Load catalog entries from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading source catalog from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_catalog(&content, ext.as_str())
        .with_context(|| format!("parsing source catalog {}", path.display()))
}

/// Load catalog entries using env var + fallbacks:
/// 1) $SOURCES_CONFIG_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
pub fn load_sources_default() -> Result<Vec<SourceEntry>> {
    load_sources_from(&resolve_catalog_path()?)
}

pub fn resolve_catalog_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        bail!("{ENV_SOURCES_PATH} points to non-existent path {}", pb.display());
    }
    for candidate in ["config/sources.toml", "config/sources.json"] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return Ok(pb);
        }
    }
    Err(anyhow!(
        "no source catalog found (set {ENV_SOURCES_PATH} or create config/sources.toml)"
    ))
}

fn parse_catalog(s: &str, hint_ext: &str) -> Result<Vec<SourceEntry>> {
    let file: CatalogFile = match hint_ext {
        "json" => serde_json::from_str(s)?,
        "toml" => toml::from_str(s)?,
        // Unknown extension: JSON if it looks like JSON, else TOML.
        _ if s.trim_start().starts_with('{') => serde_json::from_str(s)?,
        _ => toml::from_str(s)?,
    };
    Ok(file.sources)
}

/// Turn catalog entries into live sources, in catalog order. Every regex and
/// selector is compiled here, so a bad catalog fails before any source runs.
pub fn build_registry(entries: Vec<SourceEntry>) -> Result<SourceRegistry> {
    let mut sources = Vec::with_capacity(entries.len());
    for e in entries {
        let name = e.name.trim().to_string();
        let discovery = match e.kind.as_str() {
            "html_link" => HtmlLinkDiscovery::new(
                &e.page_url,
                e.link_selector.as_deref(),
                e.link_pattern.as_deref(),
                e.date_pattern.as_deref(),
            )
            .with_context(|| format!("source {name:?}"))?,
            other => bail!("source {name:?}: unknown discovery kind {other:?}"),
        };
        let rules = PatternRules::from_patterns(e.patterns)
            .with_context(|| format!("source {name:?}"))?;
        sources.push(Source::new(name, Arc::new(discovery), rules));
    }
    SourceRegistry::new(sources)
}

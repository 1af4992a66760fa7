// src/config/settings.rs
use std::path::PathBuf;

use anyhow::{anyhow, Result};

pub const ENV_RECIPIENT: &str = "NOTIFY_EMAIL_TO";
pub const ENV_SAVE_FILES: &str = "SAVE_FILES";
pub const ENV_FILES_DIR: &str = "AGENDA_FILES_DIR";
pub const ENV_DB_PATH: &str = "AGENDA_DB_PATH";
pub const ENV_SOURCES_PATH: &str = "SOURCES_CONFIG_PATH";
pub const ENV_METRICS_TEXTFILE: &str = "METRICS_TEXTFILE";

pub const DEFAULT_FILES_DIR: &str = "files";
pub const DEFAULT_DB_PATH: &str = "agendas.db";

/// Process-wide settings, read once at startup (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub recipient: String,
    /// Keep the document/text slots after a successful run.
    pub keep_files: bool,
    pub files_dir: PathBuf,
    pub db_path: PathBuf,
    pub metrics_textfile: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`Settings::from_env`] but reading from any key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let recipient = non_empty(ENV_RECIPIENT)
            .ok_or_else(|| anyhow!("{ENV_RECIPIENT} missing (notification recipient)"))?;

        Ok(Self {
            recipient,
            keep_files: non_empty(ENV_SAVE_FILES).is_some_and(|v| is_truthy(&v)),
            files_dir: non_empty(ENV_FILES_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILES_DIR)),
            db_path: non_empty(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            metrics_textfile: non_empty(ENV_METRICS_TEXTFILE).map(PathBuf::from),
        })
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// src/store/sqlite.rs
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{ArtifactStore, ProcessedRecord, StoreError};

/// Bumped whenever the table layout changes.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS agendas (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    source          TEXT NOT NULL,
    url             TEXT NOT NULL UNIQUE,
    meeting_date    TEXT NOT NULL,
    metadata_json   TEXT NOT NULL,
    fields_json     TEXT NOT NULL,
    document_sha256 TEXT,
    processed_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_agendas_source ON agendas(source);
";

/// Single-file SQLite store. First use is detected from `PRAGMA user_version`
/// rather than from whether the file exists, so an empty file left behind by
/// a crashed first run is still initialised.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the store at `path` and make sure the schema
    /// is in place.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        match version {
            0 => {
                tracing::info!(target: "store", "initialising empty agenda store");
                conn.execute_batch(SCHEMA_V1)?;
                conn.execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION};"))?;
            }
            SCHEMA_VERSION => {}
            found => {
                return Err(StoreError::UnsupportedSchema {
                    found,
                    supported: SCHEMA_VERSION,
                })
            }
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArtifactStore for SqliteStore {
    fn has_seen(&self, url: &str) -> Result<bool, StoreError> {
        let hit = self
            .conn()
            .query_row(
                "SELECT 1 FROM agendas WHERE url = ?1",
                params![url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    fn record(&self, rec: &ProcessedRecord) -> Result<(), StoreError> {
        let metadata = serde_json::to_string(&rec.metadata)?;
        let fields = serde_json::to_string(&rec.fields)?;
        let res = self.conn().execute(
            "INSERT INTO agendas
                (source, url, meeting_date, metadata_json, fields_json, document_sha256, processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rec.source,
                rec.url,
                rec.date,
                metadata,
                fields,
                rec.document_sha256,
                rec.processed_at,
            ],
        );
        match res {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Duplicate {
                    url: rec.url.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<ProcessedRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT source, url, meeting_date, metadata_json, fields_json, document_sha256, processed_at
             FROM agendas ORDER BY processed_at, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, DateTime<Utc>>(6)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (source, url, date, metadata, fields, document_sha256, processed_at) = row?;
            out.push(ProcessedRecord {
                source,
                url,
                date,
                metadata: serde_json::from_str(&metadata)?,
                fields: serde_json::from_str(&fields)?,
                document_sha256,
                processed_at,
            });
        }
        Ok(out)
    }
}

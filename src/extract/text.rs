//! Plain-text extraction from downloaded agenda documents.

use std::path::{Path, PathBuf};

use lopdf::Document;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The document could not be read from disk.
    #[error("cannot read document at {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The bytes are not a document we can parse.
    #[error("malformed document at {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Converts a document on disk into plain text. Implementations either return
/// the full text or an error; they never write output themselves.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// lopdf-backed extractor. Pages whose content stream cannot be decoded are
/// skipped; the document only counts as malformed when no page decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let malformed = |message: String| ExtractionError::Malformed {
            path: path.to_path_buf(),
            message,
        };

        let doc = Document::load_mem(&bytes).map_err(|e| malformed(e.to_string()))?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Err(malformed("document has no pages".into()));
        }

        let mut out = String::new();
        let mut decoded = 0usize;
        for page in &pages {
            match doc.extract_text(&[*page]) {
                Ok(t) => {
                    decoded += 1;
                    out.push_str(&t);
                    if !t.ends_with('\n') {
                        out.push('\n');
                    }
                }
                Err(e) => {
                    tracing::debug!(page = *page, error = %e, "skipping undecodable page");
                }
            }
        }

        if decoded == 0 {
            return Err(malformed(format!(
                "none of {} pages could be decoded",
                pages.len()
            )));
        }
        Ok(out)
    }
}

// src/notify/mod.rs
pub mod email;
pub mod log;

use anyhow::Result;

use crate::extract::ExtractedFields;
use crate::ingest::types::DiscoveryResult;

pub use email::EmailNotifier;
pub use log::LogNotifier;

/// Outbound message transport. A failed send is returned as-is; callers
/// decide whether to retry (the pipeline never does).
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// Render the "new agenda" message for one processed document.
pub fn render_message(
    source: &str,
    found: &DiscoveryResult,
    fields: &ExtractedFields,
    document_sha256: Option<&str>,
) -> RenderedMessage {
    let subject = format!("New agenda: {} {} meeting", source, found.date);

    let mut body = format!("{source} posted an agenda for the {} meeting.\n\n", found.date);

    if fields.is_empty() {
        body.push_str("No fields are configured for this source.\n");
    } else {
        for (name, value) in fields.iter() {
            body.push_str(&format!("{}: {}\n", name, value.unwrap_or("(not found)")));
        }
    }

    if !found.metadata.is_empty() {
        body.push('\n');
        for (k, v) in &found.metadata {
            body.push_str(&format!("{k}: {v}\n"));
        }
    }

    body.push_str(&format!(
        "\nDocument: {}\n",
        found.identifier().unwrap_or("(no link)")
    ));
    if let Some(sha) = document_sha256 {
        body.push_str(&format!("SHA-256: {sha}\n"));
    }

    RenderedMessage { subject, body }
}

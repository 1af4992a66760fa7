use anyhow::Result;

use super::Notifier;

/// Writes messages to the log instead of sending them. Used for dry runs
/// against a real source catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(target: "notify", recipient, subject, "message (log transport)\n{body}");
        Ok(())
    }
}

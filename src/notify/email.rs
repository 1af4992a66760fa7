use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::Notifier;

/// SMTP sender. The recipient is supplied per message; only the relay and the
/// `From` mailbox are fixed at construction.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailNotifier {
    pub fn from_env() -> Result<Self> {
        let host = required("SMTP_HOST")?;
        let user = required("SMTP_USER")?;
        let pass = required("SMTP_PASS")?;
        let from_addr = std::env::var("NOTIFY_EMAIL_FROM").unwrap_or_else(|_| user.clone());

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .with_context(|| format!("invalid SMTP_HOST {host:?}"))?
            .credentials(creds)
            .build();

        let from = from_addr
            .parse()
            .with_context(|| format!("invalid NOTIFY_EMAIL_FROM {from_addr:?}"))?;

        Ok(Self { mailer, from })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} missing"))
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let to: Mailbox = recipient
            .parse()
            .with_context(|| format!("invalid recipient {recipient:?}"))?;

        let msg = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}

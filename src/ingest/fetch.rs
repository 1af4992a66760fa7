// src/ingest/fetch.rs
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub bytes: u64,
    pub sha256: String,
}

/// Downloads a discovered document into a slot path, replacing whatever the
/// previous run left there.
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchedDocument>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchedDocument> {
        let body = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} non-2xx"))?
            .bytes()
            .await
            .with_context(|| format!("reading body of {url}"))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(dest, &body)
            .await
            .with_context(|| format!("writing {}", dest.display()))?;

        Ok(FetchedDocument {
            bytes: body.len() as u64,
            sha256: format!("{:x}", Sha256::digest(&body)),
        })
    }
}

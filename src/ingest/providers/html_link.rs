// src/ingest/providers/html_link.rs
//! Finds the latest agenda on a council's meetings page.
//!
//! The page is fetched, anchors matching `link_selector` are scanned in
//! document order, and the first whose text or href matches `link_pattern`
//! wins. Its href is resolved against the page URL. The date label comes from
//! `date_pattern` (first capture group, else whole match) applied to the link
//! text and then the href; without a pattern the link text is used.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{Html, Selector};

use crate::ingest::types::{DiscoveryResult, SourceDiscovery};

pub const DEFAULT_LINK_SELECTOR: &str = "a[href]";
pub const DEFAULT_LINK_PATTERN: &str = "(?i)agenda";

pub struct HtmlLinkDiscovery {
    page_url: Url,
    link_selector: String,
    link_pattern: Regex,
    date_pattern: Option<Regex>,
    client: Client,
    timeout: Duration,
}

impl HtmlLinkDiscovery {
    /// Validates the URL, selector and regexes up front.
    pub fn new(
        page_url: &str,
        link_selector: Option<&str>,
        link_pattern: Option<&str>,
        date_pattern: Option<&str>,
    ) -> Result<Self> {
        let page_url = Url::parse(page_url).with_context(|| format!("invalid page_url {page_url:?}"))?;
        let link_selector = link_selector.unwrap_or(DEFAULT_LINK_SELECTOR).to_string();
        parse_selector(&link_selector)?;
        let link_pattern = Regex::new(link_pattern.unwrap_or(DEFAULT_LINK_PATTERN))
            .context("compiling link_pattern")?;
        let date_pattern = date_pattern
            .map(Regex::new)
            .transpose()
            .context("compiling date_pattern")?;

        Ok(Self {
            page_url,
            link_selector,
            link_pattern,
            date_pattern,
            client: Client::new(),
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Pick the agenda link out of an already-fetched page.
    pub fn pick_link(&self, html: &str) -> Result<Option<DiscoveryResult>> {
        let sel = parse_selector(&self.link_selector)?;
        let doc = Html::parse_document(html);

        for el in doc.select(&sel) {
            let Some(href) = el.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
                continue;
            };
            let text = collapse_ws(&el.text().collect::<Vec<_>>().join(" "));
            if !self.link_pattern.is_match(&text) && !self.link_pattern.is_match(href) {
                continue;
            }

            let url = self
                .page_url
                .join(href)
                .with_context(|| format!("resolving agenda href {href:?}"))?;
            let date = self
                .date_pattern
                .as_ref()
                .and_then(|re| first_match(re, &text).or_else(|| first_match(re, href)))
                .unwrap_or_else(|| text.clone());

            let mut metadata = BTreeMap::new();
            metadata.insert("link_text".to_string(), text);
            metadata.insert("page_url".to_string(), self.page_url.to_string());

            return Ok(Some(DiscoveryResult {
                url: Some(url.to_string()),
                date,
                metadata,
            }));
        }
        Ok(None)
    }
}

#[async_trait]
impl SourceDiscovery for HtmlLinkDiscovery {
    async fn discover(&self) -> Result<Option<DiscoveryResult>> {
        let body = self
            .client
            .get(self.page_url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {}", self.page_url))?
            .error_for_status()
            .with_context(|| format!("GET {} non-2xx", self.page_url))?
            .text()
            .await
            .context("reading meetings page")?;
        self.pick_link(&body)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid link_selector {s:?}: {e}"))
}

fn first_match(re: &Regex, hay: &str) -> Option<String> {
    let caps = re.captures(hay)?;
    let m = caps.iter().skip(1).flatten().next().or_else(|| caps.get(0))?;
    let v = m.as_str().trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

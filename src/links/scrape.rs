// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search result page scraping
//!
//! Fetches a Google result page with a browser User-Agent and collects the
//! target URLs of its result anchors. No API key required.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::provider::LinkSource;
use super::types::{LinkSet, LinkSourceError};

const GOOGLE_BASE_URL: &str = "https://www.google.com";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Link source that scrapes a search engine result page
pub struct GoogleScrapeSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GoogleScrapeSource {
    /// Create a scraper against google.com
    pub fn new(timeout: Duration) -> Result<Self, LinkSourceError> {
        Self::with_base_url(GOOGLE_BASE_URL, timeout)
    }

    /// Create a scraper against another host serving the same page layout
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, LinkSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| LinkSourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl LinkSource for GoogleScrapeSource {
    async fn fetch_links(
        &self,
        query: &str,
        max_links: usize,
    ) -> Result<LinkSet, LinkSourceError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| LinkSourceError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkSourceError::Status {
                status: status.as_u16(),
                message: "result page request failed".to_string(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| LinkSourceError::from_reqwest(e, self.timeout))?;
        let links = parse_result_links(&html, max_links);
        debug!("Scraped {} links from result page", links.len());

        Ok(links)
    }

    fn name(&self) -> &'static str {
        "scrape"
    }
}

/// Extract result links from a result page
///
/// Result anchors look like `<a href="/url?q=https://target&sa=...">`. When
/// the page carries none of those (some layouts link directly), absolute
/// anchors that do not point back at the search engine are used instead.
pub fn parse_result_links(html: &str, max_links: usize) -> LinkSet {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return LinkSet::empty(),
    };

    let hrefs: Vec<&str> = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .collect();

    let redirected: Vec<String> = hrefs
        .iter()
        .filter(|href| href.starts_with("/url?q="))
        .filter_map(|href| decode_redirect(href))
        .filter(|target| target.starts_with("http"))
        .collect();

    if !redirected.is_empty() {
        return LinkSet::from_candidates(redirected, max_links);
    }

    let direct = hrefs
        .iter()
        .filter(|href| href.starts_with("http"))
        .filter(|href| !is_search_engine_link(href));

    LinkSet::from_candidates(direct, max_links)
}

/// Decode the `q` parameter of a `/url?q=` redirect
fn decode_redirect(href: &str) -> Option<String> {
    let base = Url::parse(GOOGLE_BASE_URL).ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
}

fn is_search_engine_link(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => url
            .host_str()
            .map(|host| host.contains("google.") || host.ends_with("gstatic.com"))
            .unwrap_or(true),
        Err(_) => true,
    }
}

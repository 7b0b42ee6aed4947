// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Brave Search API link source
//!
//! Hosted search API; requires `BRAVE_API_KEY`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::LinkSource;
use super::types::{LinkSet, LinkSourceError};

const BRAVE_API_URL: &str = "https://api.search.brave.com";
const BRAVE_SEARCH_PATH: &str = "/res/v1/web/search";

/// Brave Search API link source
pub struct BraveLinkSource {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BraveLinkSource {
    /// Create a new Brave link source
    ///
    /// # Arguments
    /// * `api_key` - Brave Search API key
    /// * `timeout` - HTTP client timeout
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LinkSourceError> {
        Self::with_base_url(api_key, BRAVE_API_URL, timeout)
    }

    /// Point the client at another base URL (contract tests)
    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LinkSourceError> {
        if api_key.trim().is_empty() {
            return Err(LinkSourceError::Unavailable(
                "no Brave API key configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LinkSourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl LinkSource for BraveLinkSource {
    async fn fetch_links(
        &self,
        query: &str,
        max_links: usize,
    ) -> Result<LinkSet, LinkSourceError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, BRAVE_SEARCH_PATH))
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", &max_links.min(20).to_string())])
            .send()
            .await
            .map_err(|e| LinkSourceError::from_reqwest(e, self.timeout))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(LinkSourceError::Unavailable(
                "Brave rejected the API key".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LinkSourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let data: BraveResponse = response
            .json()
            .await
            .map_err(|e| LinkSourceError::Parse(format!("JSON parse error: {}", e)))?;

        let urls = data
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.url);

        Ok(LinkSet::from_candidates(urls, max_links))
    }

    fn name(&self) -> &'static str {
        "brave"
    }
}

#[derive(Debug, serde::Deserialize)]
struct BraveResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, serde::Deserialize)]
struct BraveWebResults {
    results: Vec<BraveResult>,
}

#[derive(Debug, serde::Deserialize)]
struct BraveResult {
    url: String,
}

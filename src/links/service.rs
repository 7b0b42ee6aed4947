// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Link lookup orchestration
//!
//! Coordinates the result cache and the configured link source. Lookups fail
//! closed: any source error ends as an empty [`LinkSet`], and failures are
//! never cached.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{LinkConfig, LinkSourceKind, UpstreamConfig};
use crate::slug::Slug;
use crate::upstream::{call_with_retry, RetryPolicy};

use super::brave::BraveLinkSource;
use super::cache::{CacheStats, LinkCache};
use super::provider::LinkSource;
use super::script::ScriptLinkSource;
use super::scrape::GoogleScrapeSource;
use super::types::{LinkSet, LinkSourceError};

/// Where a lookup's links came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    /// Served from the result cache
    Cache,
    /// Fetched from the link source just now
    Source,
    /// The source failed; the empty set stands in for its answer
    Failed,
}

/// Result of a link lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLookup {
    pub links: LinkSet,
    pub origin: LinkOrigin,
}

/// Link lookup service: cache in front of one link source
pub struct LinkService {
    source: Arc<dyn LinkSource>,
    cache: LinkCache,
    policy: RetryPolicy,
    max_links: usize,
    cache_empty_results: bool,
}

impl LinkService {
    /// Create a service around an already built source and cache
    pub fn new(
        source: Arc<dyn LinkSource>,
        cache: LinkCache,
        policy: RetryPolicy,
        max_links: usize,
        cache_empty_results: bool,
    ) -> Self {
        Self {
            source,
            cache,
            policy,
            max_links,
            cache_empty_results,
        }
    }

    /// Build the service from configuration
    pub fn from_config(
        links: &LinkConfig,
        upstream: &UpstreamConfig,
    ) -> Result<Self, LinkSourceError> {
        let source = build_link_source(links, upstream.link_timeout())?;
        Ok(Self::new(
            source,
            LinkCache::new(links.cache_ttl()),
            RetryPolicy::for_links(upstream),
            links.max_links,
            links.cache_empty_results,
        ))
    }

    /// Look up links for a query, consulting the cache first
    pub async fn lookup(&self, slug: &Slug, query: &str) -> LinkLookup {
        if let Some(links) = self.cache.get(slug) {
            debug!("Link cache hit for {}", slug);
            return LinkLookup {
                links,
                origin: LinkOrigin::Cache,
            };
        }

        let start = Instant::now();
        let source = self.source.clone();
        let max_links = self.max_links;
        let result = call_with_retry(
            &self.policy,
            source.name(),
            || {
                let source = source.clone();
                async move { source.fetch_links(query, max_links).await }
            },
            |timeout: Duration| LinkSourceError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            },
        )
        .await;

        match result {
            Ok(links) => {
                info!(
                    "Link lookup for {}: {} links from {} in {}ms",
                    slug,
                    links.len(),
                    self.source.name(),
                    start.elapsed().as_millis()
                );
                if !links.is_empty() || self.cache_empty_results {
                    self.cache.put(slug, links.clone());
                }
                LinkLookup {
                    links,
                    origin: LinkOrigin::Source,
                }
            }
            Err(e) => {
                warn!(
                    "Link source {} failed for {}: {}, continuing without links",
                    self.source.name(),
                    slug,
                    e
                );
                LinkLookup {
                    links: LinkSet::empty(),
                    origin: LinkOrigin::Failed,
                }
            }
        }
    }

    /// Name of the configured source
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Build the link source selected by configuration
pub fn build_link_source(
    config: &LinkConfig,
    timeout: Duration,
) -> Result<Arc<dyn LinkSource>, LinkSourceError> {
    let source: Arc<dyn LinkSource> = match config.source {
        LinkSourceKind::Scrape => Arc::new(GoogleScrapeSource::new(timeout)?),
        LinkSourceKind::Brave => {
            let api_key = config.brave_api_key.clone().ok_or_else(|| {
                LinkSourceError::Unavailable("no Brave API key configured".to_string())
            })?;
            Arc::new(BraveLinkSource::new(api_key, timeout)?)
        }
        LinkSourceKind::Script => Arc::new(ScriptLinkSource::new(
            config.script_interpreter.clone(),
            config.script_path.clone(),
        )),
    };
    debug!("Link source enabled: {}", source.name());
    Ok(source)
}

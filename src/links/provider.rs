// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Link source trait definition

use async_trait::async_trait;

use super::types::{LinkSet, LinkSourceError};

/// Capability for retrieving reference links for a query
///
/// Implementations may scrape a result page, call a hosted search API or run
/// a local program. They report failures as errors; turning those into an
/// empty [`LinkSet`] is the job of [`super::LinkService`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Fetch up to `max_links` absolute URLs for `query`, best first
    async fn fetch_links(&self, query: &str, max_links: usize)
        -> Result<LinkSet, LinkSourceError>;

    /// Source name for logging and `/health`
    fn name(&self) -> &'static str;
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for link retrieval

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::upstream::Retryable;

/// Ordered, de-duplicated list of absolute reference URLs for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSet(Vec<String>);

impl LinkSet {
    /// An empty link set
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a link set from raw candidates
    ///
    /// Keeps only absolute `http`/`https` URLs, drops duplicates while
    /// preserving first-seen order and stops at `max_links`.
    pub fn from_candidates<I, S>(candidates: I, max_links: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut links: Vec<String> = Vec::new();
        for candidate in candidates {
            if links.len() >= max_links {
                break;
            }
            let candidate = candidate.as_ref().trim();
            let parsed = match Url::parse(candidate) {
                Ok(url) => url,
                Err(_) => continue,
            };
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                continue;
            }
            let link = candidate.to_string();
            if !links.contains(&link) {
                links.push(link);
            }
        }
        Self(links)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors raised by link source implementations
///
/// These never leave [`super::LinkService`], which fails closed to an empty
/// [`LinkSet`].
#[derive(Debug, Error)]
pub enum LinkSourceError {
    /// Upstream did not answer within the deadline
    #[error("Link source timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport-level failure
    #[error("Link source request failed: {0}")]
    Http(String),

    /// Upstream answered with a non-success status
    #[error("Link source returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Upstream answered with something we could not parse
    #[error("Malformed link source response: {0}")]
    Parse(String),

    /// The local script failed or printed an error
    #[error("Link script failed: {0}")]
    Script(String),

    /// Missing credentials or otherwise unusable source
    #[error("Link source unavailable: {0}")]
    Unavailable(String),
}

impl Retryable for LinkSourceError {
    fn is_retryable(&self) -> bool {
        match self {
            LinkSourceError::Timeout { .. } | LinkSourceError::Http(_) => true,
            LinkSourceError::Status { status, .. } => *status == 429 || *status >= 500,
            LinkSourceError::Parse(_)
            | LinkSourceError::Script(_)
            | LinkSourceError::Unavailable(_) => false,
        }
    }
}

impl LinkSourceError {
    /// Map a client error, reporting timeouts against the client's deadline
    pub fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            LinkSourceError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            LinkSourceError::Http(e.to_string())
        }
    }
}

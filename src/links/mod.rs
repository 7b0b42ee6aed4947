// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reference link retrieval
//!
//! Supplies the handful of URLs an article cites:
//! - Interchangeable link sources (result-page scrape, Brave API, local script)
//! - TTL-based result caching keyed by slug
//! - Per-call deadline and bounded retry
//! - Fail-closed lookups: errors become an empty link set

pub mod brave;
pub mod cache;
pub mod provider;
pub mod scrape;
pub mod script;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use brave::BraveLinkSource;
pub use cache::{CacheStats, LinkCache};
pub use provider::LinkSource;
pub use scrape::GoogleScrapeSource;
pub use script::ScriptLinkSource;
pub use service::{build_link_source, LinkLookup, LinkOrigin, LinkService};
pub use types::{LinkSet, LinkSourceError};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based link set caching
//!
//! Memory only: entries disappear at TTL expiry or process restart. There is
//! no invalidation API beyond expiry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::slug::Slug;

use super::types::LinkSet;

/// Upper bound on cached queries; the oldest entry is evicted beyond it
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// TTL-based cache from slug to link set
pub struct LinkCache {
    cache: RwLock<HashMap<Slug, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

struct CachedEntry {
    links: LinkSet,
    inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries in cache
    pub total: usize,
    /// Expired entries (not yet evicted)
    pub expired: usize,
    /// Maximum cache capacity
    pub max: usize,
}

impl LinkCache {
    /// Create a cache on the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, DEFAULT_MAX_ENTRIES, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock and capacity
    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            clock,
        }
    }

    /// Get the cached link set for a slug
    ///
    /// Returns None if not found or expired
    pub fn get(&self, slug: &Slug) -> Option<LinkSet> {
        let now = self.clock.now();
        {
            let cache = self.cache.read().ok()?;
            let entry = cache.get(slug)?;
            if !self.is_expired(entry, now) {
                return Some(entry.links.clone());
            }
        }

        // Expired: drop it so it does not linger until the next insert
        if let Ok(mut cache) = self.cache.write() {
            if cache
                .get(slug)
                .map(|e| self.is_expired(e, now))
                .unwrap_or(false)
            {
                cache.remove(slug);
            }
        }
        None
    }

    /// Insert a link set; it expires `ttl` after this call
    pub fn put(&self, slug: &Slug, links: LinkSet) {
        let now = self.clock.now();
        let mut cache = match self.cache.write() {
            Ok(c) => c,
            Err(_) => return,
        };

        cache.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);

        if cache.len() >= self.max_entries && !cache.contains_key(slug) {
            Self::evict_oldest(&mut cache);
        }

        cache.insert(
            slug.clone(),
            CachedEntry {
                links,
                inserted_at: now,
            },
        );
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let cache = match self.cache.read() {
            Ok(c) => c,
            Err(_) => {
                return CacheStats {
                    total: 0,
                    expired: 0,
                    max: self.max_entries,
                }
            }
        };

        CacheStats {
            total: cache.len(),
            expired: cache.values().filter(|e| self.is_expired(e, now)).count(),
            max: self.max_entries,
        }
    }

    fn is_expired(&self, entry: &CachedEntry, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) >= self.ttl
    }

    fn evict_oldest(cache: &mut HashMap<Slug, CachedEntry>) {
        if let Some(oldest_key) = cache
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            cache.remove(&oldest_key);
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-client rate limiter for searches (sliding window)

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Tracked clients before idle ones are dropped
const PRUNE_THRESHOLD: usize = 10_000;

/// Per-client sliding-window rate limiter
///
/// A client may make `max_per_window` requests in any rolling `window`.
/// Rejected requests are not recorded, so a client that keeps retrying is
/// admitted again as soon as its oldest accepted request ages out.
pub struct ClientRateLimiter {
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_per_window: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl ClientRateLimiter {
    /// Create a rate limiter with a 60-second window
    pub fn new(max_per_minute: u32) -> Self {
        Self::with_clock(
            max_per_minute as usize,
            Duration::from_secs(60),
            Arc::new(SystemClock),
        )
    }

    /// Create a rate limiter with a custom window and clock
    pub fn with_clock(max_per_window: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            max_per_window: max_per_window.max(1),
            window,
            clock,
        }
    }

    /// Admit and record a request, or return how long until one is admitted
    pub fn check_and_record(&self, client: &str) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if clients.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            clients.retain(|_, stamps| {
                stamps
                    .back()
                    .map(|&t| now.duration_since(t) < window)
                    .unwrap_or(false)
            });
        }

        let stamps = clients.entry(client.to_string()).or_default();
        while let Some(&oldest) = stamps.front() {
            if now.duration_since(oldest) >= self.window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() >= self.max_per_window {
            let retry_after = stamps
                .front()
                .map(|&oldest| self.window.saturating_sub(now.duration_since(oldest)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        stamps.push_back(now);
        Ok(())
    }
}

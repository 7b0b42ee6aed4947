// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deadline and bounded-retry wrapper for external calls
//!
//! Every link source and generator call runs under a per-attempt timeout.
//! Failed attempts are retried with exponential backoff (base, 2x base,
//! 4x base, ...) until `max_attempts` is reached or the error is not worth
//! retrying.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::UpstreamConfig;

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Deadline and retry settings for one kind of external call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each later one
    pub base_delay: Duration,
    /// Deadline per attempt
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub fn once(timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            timeout,
        }
    }

    pub fn for_links(config: &UpstreamConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay(),
            timeout: config.link_timeout(),
        }
    }

    pub fn for_generation(config: &UpstreamConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay(),
            timeout: config.generation_timeout(),
        }
    }

    /// Backoff before attempt number `attempt` (1-based, attempt 1 has none)
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(16);
        self.base_delay.saturating_mul(1u32 << exp)
    }
}

/// Run `op` under the policy's deadline, retrying retryable failures
///
/// `on_timeout` builds the error returned when an attempt exceeds its
/// deadline; the in-flight future is dropped, which cancels it.
pub async fn call_with_retry<T, E, F, Fut, TO>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
    on_timeout: TO,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
    TO: Fn(Duration) -> E,
{
    let mut attempt = 1;
    loop {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            debug!("{}: waiting {:?} before attempt {}", label, delay, attempt);
            tokio::time::sleep(delay).await;
        }

        let result = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(policy.timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && e.is_retryable() => {
                warn!(
                    "{}: attempt {}/{} failed: {}, retrying",
                    label, attempt, policy.max_attempts, e
                );
                attempt += 1;
            }
            Err(e) => {
                warn!(
                    "{}: attempt {}/{} failed: {}",
                    label, attempt, policy.max_attempts, e
                );
                return Err(e);
            }
        }
    }
}

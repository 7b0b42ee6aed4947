// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation errors

use std::time::Duration;
use thiserror::Error;

use crate::upstream::Retryable;

/// Errors that can occur while generating article text
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Generation did not finish within the deadline
    #[error("Generation timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport-level failure
    #[error("Generation request failed: {0}")]
    Http(String),

    /// Upstream answered with a non-success status
    #[error("Generator returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Upstream response could not be decoded
    #[error("Malformed generator response: {0}")]
    Parse(String),

    /// The response carried no text
    #[error("Generator returned no text")]
    EmptyResponse,

    /// The prompt or answer was refused
    #[error("Generation blocked: {reason}")]
    Blocked { reason: String },

    /// No credentials configured
    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Timeout { .. }
            | GenerationError::Http(_)
            | GenerationError::EmptyResponse => true,
            GenerationError::Status { status, .. } => *status == 429 || *status >= 500,
            GenerationError::Parse(_)
            | GenerationError::Blocked { .. }
            | GenerationError::NotConfigured(_) => false,
        }
    }
}

impl GenerationError {
    /// Map a client error, reporting timeouts against the client's deadline
    pub fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            GenerationError::Http(e.to_string())
        }
    }
}

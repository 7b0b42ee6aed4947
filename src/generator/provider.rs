// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content generator trait definition

use async_trait::async_trait;

use super::types::GenerationError;

/// Capability for turning a prompt into article text (markdown or plain)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate text for `prompt`; failures propagate to the caller
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

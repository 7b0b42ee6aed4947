// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local script link source
//!
//! Runs `<interpreter> <script> <query> <count>` and reads a JSON array of
//! results from stdout. Each entry is either a bare URL string or an object
//! carrying a `link` field (`{"title": ..., "link": ..., "snippet": ...}`).

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::provider::LinkSource;
use super::types::{LinkSet, LinkSourceError};

/// Link source backed by a local program
pub struct ScriptLinkSource {
    interpreter: String,
    script: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptEntry {
    Url(String),
    Result { link: Option<String> },
}

impl ScriptLinkSource {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }
}

#[async_trait]
impl LinkSource for ScriptLinkSource {
    async fn fetch_links(
        &self,
        query: &str,
        max_links: usize,
    ) -> Result<LinkSet, LinkSourceError> {
        debug!(
            "Running link script {} {}",
            self.interpreter,
            self.script.display()
        );

        let output = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(query)
            .arg(max_links.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| LinkSourceError::Script(format!("failed to spawn: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LinkSourceError::Script(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_script_output(&stdout, max_links)
    }

    fn name(&self) -> &'static str {
        "script"
    }
}

/// Parse the JSON printed by the link script
pub fn parse_script_output(stdout: &str, max_links: usize) -> Result<LinkSet, LinkSourceError> {
    let trimmed = stdout.trim();
    let entries: Vec<ScriptEntry> = serde_json::from_str(trimmed).map_err(|_| {
        let first_line = trimmed.lines().next().unwrap_or_default();
        LinkSourceError::Script(first_line.to_string())
    })?;

    let urls = entries.into_iter().filter_map(|entry| match entry {
        ScriptEntry::Url(url) => Some(url),
        ScriptEntry::Result { link } => link,
    });

    Ok(LinkSet::from_candidates(urls, max_links))
}

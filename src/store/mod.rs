// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Article storage
//!
//! One `<slug>.html` file per article in a dedicated directory. Writes are
//! unconditional overwrites (last writer wins). A periodic sweep deletes
//! every file in the directory regardless of its age, except the hidden
//! temporary files of writes still in flight.

pub mod sweeper;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::slug::Slug;

pub use sweeper::spawn_sweeper;

const ARTICLE_EXTENSION: &str = "html";
const TEMP_EXTENSION: &str = "tmp";

/// Article store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No article stored for {0}")]
    NotFound(String),

    #[error("Article store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory-backed store of rendered articles
#[derive(Clone)]
pub struct ArticleStore {
    dir: PathBuf,
    write_seq: Arc<AtomicU64>,
}

impl ArticleStore {
    /// Create a store rooted at `dir` (created on first write if missing)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create the store directory if needed
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a slug
    pub fn path_for(&self, slug: &Slug) -> PathBuf {
        self.dir
            .join(format!("{}.{}", slug.as_str(), ARTICLE_EXTENSION))
    }

    /// Whether an article is stored for `slug`
    pub async fn exists(&self, slug: &Slug) -> bool {
        tokio::fs::try_exists(self.path_for(slug))
            .await
            .unwrap_or(false)
    }

    /// Read the stored article for `slug`
    pub async fn read(&self, slug: &Slug) -> Result<String, StoreError> {
        let path = self.path_for(slug);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(slug.to_string()))
            }
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Store an article, replacing any existing one
    ///
    /// The content is written to a hidden temporary file and renamed into
    /// place, so readers never observe a half-written article.
    pub async fn write(&self, slug: &Slug, content: &str) -> Result<(), StoreError> {
        self.ensure_dir().await?;

        let path = self.path_for(slug);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{}.{}.{}.tmp", slug.as_str(), std::process::id(), seq));

        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&path, e));
        }

        debug!("Stored article {} ({} bytes)", slug, content.len());
        Ok(())
    }

    /// Delete every file in the store directory except in-flight writes
    ///
    /// Individual failures are logged and skipped. Returns the number of
    /// files removed.
    pub async fn sweep(&self) -> Result<usize, StoreError> {
        self.remove_files(|path| !is_temp_file(path)).await
    }

    /// Delete temporary files left behind by interrupted writes
    ///
    /// Only safe while no writes are running, i.e. at startup.
    pub async fn remove_temp_files(&self) -> Result<usize, StoreError> {
        let removed = self.remove_files(is_temp_file).await?;
        if removed > 0 {
            warn!("Removed {} stale temporary article files", removed);
        }
        Ok(removed)
    }

    async fn remove_files(&self, select: impl Fn(&Path) -> bool) -> Result<usize, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file || !select(&path) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Deleted {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
            }
        }

        debug!("Removed {} files from {}", removed, self.dir.display());
        Ok(removed)
    }

    /// Slugs of all stored articles, sorted
    pub async fn list_slugs(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut slugs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARTICLE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    slugs.push(stem.to_string());
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Stored slugs matching a partial query
    ///
    /// Case-insensitive substring match with dashes treated as spaces on
    /// both sides.
    pub async fn suggest(&self, term: &str) -> Result<Vec<String>, StoreError> {
        let needle = normalize_for_match(term);
        let slugs = self.list_slugs().await?;
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(slugs
            .into_iter()
            .filter(|slug| normalize_for_match(slug).contains(&needle))
            .collect())
    }

    /// Number of stored articles
    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list_slugs().await?.len())
    }
}

/// Hidden `.{slug}.{pid}.{seq}.tmp` file written by [`ArticleStore::write`]
fn is_temp_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false);
    hidden && path.extension().and_then(|e| e.to_str()) == Some(TEMP_EXTENSION)
}

fn normalize_for_match(s: &str) -> String {
    s.to_lowercase().replace('-', " ").trim().to_string()
}

//! Object storage collaborators.
//!
//! The orchestrator only needs two things from a store: write a blob under a
//! key, and turn the returned locator into a URL anyone can open.

use crate::error::{SnapError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Opaque handle identifying where a blob was written
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `blob` under `key`. Durable once this returns `Ok`.
    async fn put(&self, key: &str, blob: Vec<u8>, content_type: &str) -> Result<Locator>;

    /// Public URL for a previously stored blob
    fn public_url_for(&self, locator: &Locator) -> String;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Joins a base URL and a path segment with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Stores blobs as files under a root directory.
///
/// Useful for self-hosting behind a static file server: with a public base URL
/// set, `{base_url}/{key}` is handed out, otherwise a `file://` URL.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(SnapError::Upload(format!("invalid object key: {:?}", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for DirectoryStore {
    async fn put(&self, key: &str, blob: Vec<u8>, content_type: &str) -> Result<Locator> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SnapError::Upload(format!("{}: {}", self.root.display(), e)))?;

        // Existing objects are never overwritten
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| SnapError::Upload(format!("{}: {}", path.display(), e)))?;
        file.write_all(&blob)
            .await
            .map_err(|e| SnapError::Upload(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| SnapError::Upload(format!("{}: {}", path.display(), e)))?;

        debug!(key, content_type, size = blob.len(), "stored in directory");
        Ok(Locator::new(key))
    }

    fn public_url_for(&self, locator: &Locator) -> String {
        match &self.public_base_url {
            Some(base) => join_url(base, locator.as_str()),
            None => {
                let path = self.root.join(locator.as_str());
                let absolute = std::path::absolute(&path).unwrap_or(path);
                format!("file://{}", absolute.display())
            }
        }
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

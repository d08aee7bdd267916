//! Upload metadata persistence.

use crate::error::{SnapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Row written for every uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub file_name: String,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// How a failed metadata write affects the item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataPolicy {
    /// The item fails when its record cannot be written
    #[default]
    Required,
    /// The failure is logged and the upload still counts as completed
    BestEffort,
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert(&self, record: &MetadataRecord) -> Result<()>;
}

/// Appends records as JSON lines to a local file.
pub struct JsonlMetadataStore {
    path: PathBuf,
    // Serializes appends so lines never interleave
    lock: Mutex<()>,
}

impl JsonlMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl MetadataStore for JsonlMetadataStore {
    async fn insert(&self, record: &MetadataRecord) -> Result<()> {
        let mut line =
            serde_json::to_string(record).map_err(|e| SnapError::Metadata(e.to_string()))?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SnapError::Metadata(format!("{}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SnapError::Metadata(format!("{}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| SnapError::Metadata(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

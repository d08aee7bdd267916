//! Per-image lifecycle record.

use crate::error::{SnapError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing state of an item. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Failed)
    }

    /// Allowed moves: pending -> processing, and any non-terminal state -> failed;
    /// only processing may complete.
    pub fn can_advance_to(&self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Processing)
                | (ItemStatus::Processing, ItemStatus::Completed)
                | (ItemStatus::Pending, ItemStatus::Failed)
                | (ItemStatus::Processing, ItemStatus::Failed)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Final details recorded when an upload succeeds
#[derive(Debug, Clone)]
pub struct Completion {
    pub public_url: String,
    pub object_key: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub caption: Option<String>,
}

/// One submitted image and its processing state.
///
/// Fields are private so the status and the public URL can only change together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageItem {
    id: ItemId,
    original_name: String,
    size_bytes: u64,
    mime_type: String,
    status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl ImageItem {
    pub fn new(original_name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            original_name: original_name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            status: ItemStatus::Pending,
            public_url: None,
            object_key: None,
            caption: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Set if and only if the item completed
    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }

    pub fn object_key(&self) -> Option<&str> {
        self.object_key.as_deref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn advance(&mut self, next: ItemStatus) -> Result<()> {
        if !self.status.can_advance_to(next) {
            return Err(SnapError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn start_processing(&mut self) -> Result<()> {
        self.advance(ItemStatus::Processing)
    }

    pub fn complete(&mut self, completion: Completion) -> Result<()> {
        if completion.public_url.is_empty() {
            return Err(SnapError::Upload("store returned an empty public URL".to_string()));
        }
        self.advance(ItemStatus::Completed)?;
        self.public_url = Some(completion.public_url);
        self.object_key = Some(completion.object_key);
        self.size_bytes = completion.size_bytes;
        self.mime_type = completion.mime_type;
        self.caption = completion.caption;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.advance(ItemStatus::Failed)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

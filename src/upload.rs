//! Batch upload orchestration.
//!
//! Every item of a batch is registered before any work starts, then items are
//! processed strictly one after another: compress, store, resolve the public
//! URL, caption, record metadata. A failing item is marked failed and the
//! batch moves on.

use crate::batch::{BatchSummary, SourceFile};
use crate::caption::{caption_or_placeholder, Captioner};
use crate::constants::FALLBACK_MIME_TYPE;
use crate::error::{SnapError, Result};
use crate::formats::{extension_for, mime_type_for, sniff_format};
use crate::item::{Completion, ImageItem, ItemStatus};
use crate::metadata::{MetadataPolicy, MetadataRecord, MetadataStore};
use crate::naming::{object_key, original_extension};
use crate::processing::{compress, CompressedImage};
use crate::profile::CompressionProfile;
use crate::storage::ObjectStore;
use crate::tracker::{ItemEvent, ItemTracker};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

pub struct Uploader {
    objects: Arc<dyn ObjectStore>,
    metadata: Option<Arc<dyn MetadataStore>>,
    captioner: Option<Arc<dyn Captioner>>,
    metadata_policy: MetadataPolicy,
    tracker: Arc<ItemTracker>,
}

impl Uploader {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            objects,
            metadata: None,
            captioner: None,
            metadata_policy: MetadataPolicy::default(),
            tracker: Arc::new(ItemTracker::new()),
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataStore>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.metadata_policy = policy;
        self
    }

    pub fn with_captioner(mut self, captioner: Arc<dyn Captioner>) -> Self {
        self.captioner = Some(captioner);
        self
    }

    /// Item updates for every batch submitted through this uploader
    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
        self.tracker.subscribe()
    }

    pub fn tracker(&self) -> Arc<ItemTracker> {
        Arc::clone(&self.tracker)
    }

    /// Current state of all items, in registration order
    pub async fn items(&self) -> Vec<ImageItem> {
        self.tracker.snapshot().await
    }

    /// Forgets every item. Stored objects and in-flight work are unaffected.
    pub async fn clear_all(&self) {
        self.tracker.clear().await;
    }

    /// Uploads `files` in order under `profile`.
    ///
    /// Never fails as a whole: per-item problems end up as failed items.
    pub async fn submit_batch(
        &self,
        files: Vec<SourceFile>,
        profile: &CompressionProfile,
    ) -> BatchSummary {
        let start_time = Instant::now();
        info!(files = files.len(), profile = profile.name(), store = self.objects.name(), "starting batch");

        let mut queue = Vec::with_capacity(files.len());
        for file in files {
            let mime_type = sniff_format(&file.bytes)
                .map(mime_type_for)
                .unwrap_or(FALLBACK_MIME_TYPE);
            let item = ImageItem::new(file.name.clone(), file.size(), mime_type);
            self.tracker.register(item.clone()).await;
            queue.push((item, file));
        }

        let mut bytes_before = 0;
        let mut bytes_after = 0;
        let mut items = Vec::with_capacity(queue.len());

        for (item, file) in queue {
            let source_size = file.size();
            let item = self.process_item(item, file, profile).await;
            if item.status() == ItemStatus::Completed {
                bytes_before += source_size;
                bytes_after += item.size_bytes();
            }
            items.push(item);
        }

        let summary = BatchSummary {
            items,
            bytes_before,
            bytes_after,
            elapsed: start_time.elapsed(),
        };
        info!(
            completed = summary.completed(),
            failed = summary.failed(),
            elapsed = ?summary.elapsed,
            "batch finished"
        );
        summary
    }

    /// Runs one item through the pipeline and returns its terminal state.
    ///
    /// The batch owns `item`; the tracker only mirrors it, so clearing the
    /// tracker stops reporting for this item but not the upload itself.
    #[instrument(skip_all, fields(item = %item.id(), name = %file.name))]
    async fn process_item(
        &self,
        mut item: ImageItem,
        file: SourceFile,
        profile: &CompressionProfile,
    ) -> ImageItem {
        if let Err(e) = self.advance(&mut item, |item| item.start_processing()).await {
            error!(error = %e, "item cannot be processed");
            return item;
        }

        let result = match self.run_pipeline(&file.name, file.bytes, profile).await {
            Ok(completion) => self.advance(&mut item, |item| item.complete(completion)).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => info!(
                url = item.public_url().unwrap_or_default(),
                size = item.size_bytes(),
                "uploaded"
            ),
            Err(e) => {
                error!(error = %e, "upload failed");
                let reason = e.to_string();
                if let Err(e) = self.advance(&mut item, |item| item.fail(reason)).await {
                    warn!(error = %e, "could not mark item failed");
                }
            }
        }
        item
    }

    /// Applies `change` to the batch copy of an item and mirrors it to the
    /// tracker. The item is left untouched when `change` fails.
    async fn advance<F>(&self, item: &mut ImageItem, change: F) -> Result<()>
    where
        F: FnOnce(&mut ImageItem) -> Result<()>,
    {
        let mut draft = item.clone();
        change(&mut draft)?;
        *item = draft;
        if !self.tracker.sync(item).await {
            debug!(item = %item.id(), "item cleared, no longer reported");
        }
        Ok(())
    }

    async fn run_pipeline(
        &self,
        name: &str,
        bytes: Vec<u8>,
        profile: &CompressionProfile,
    ) -> Result<Completion> {
        let compressed = compress(bytes, profile).await?;
        debug!(
            before = compressed.original_size,
            after = compressed.size(),
            outcome = ?compressed.outcome,
            "compressed"
        );

        let key = object_key(name, &key_extension(name, &compressed, profile));
        let mime_type = compressed.mime_type().to_string();
        let size_bytes = compressed.size();

        let caption = match &self.captioner {
            Some(captioner) => {
                Some(caption_or_placeholder(captioner.as_ref(), &compressed.bytes, &mime_type).await)
            }
            None => None,
        };

        let locator = self.objects.put(&key, compressed.bytes, &mime_type).await?;
        let public_url = self.objects.public_url_for(&locator);
        debug!(key = %key, locator = %locator, "stored");

        if let Some(metadata) = &self.metadata {
            let record = MetadataRecord {
                file_name: name.to_string(),
                url: public_url.clone(),
                size: size_bytes,
                mime_type: mime_type.clone(),
                caption: caption.clone(),
                uploaded_at: Utc::now(),
            };
            if let Err(e) = metadata.insert(&record).await {
                match self.metadata_policy {
                    MetadataPolicy::Required => return Err(e),
                    MetadataPolicy::BestEffort => {
                        warn!(error = %e, "metadata not recorded, keeping upload")
                    }
                }
            }
        }

        Ok(Completion {
            public_url,
            object_key: key,
            size_bytes,
            mime_type,
            caption,
        })
    }
}

/// Extension for the stored object.
///
/// Recompressing profiles name the object after the format actually uploaded;
/// passthrough keeps the user's extension when there is one.
fn key_extension(
    original_name: &str,
    compressed: &CompressedImage,
    profile: &CompressionProfile,
) -> String {
    if profile.is_passthrough() {
        original_extension(original_name)
            .unwrap_or_else(|| extension_for(compressed.format).to_string())
    } else {
        compressed.extension().to_string()
    }
}

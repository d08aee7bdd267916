use crate::constants::{
    DEFAULT_EPOCHS, DEFAULT_WALRUS_AGGREGATOR, DEFAULT_WALRUS_PUBLISHER, TEMP_EPOCHS,
    WALRUS_BLOB_PATH,
};
use crate::error::{SnapError, Result};
use crate::storage::{join_url, Locator, ObjectStore};
use async_trait::async_trait;
use tracing::debug;
use walrus_rs::models::BlobStoreResult;
use walrus_rs::WalrusClient;

#[derive(Debug, Clone)]
pub struct WalrusOptions {
    pub aggregator_url: String,
    pub publisher_url: String,
    pub epochs: Option<u64>,
}

impl Default for WalrusOptions {
    fn default() -> Self {
        Self {
            aggregator_url: DEFAULT_WALRUS_AGGREGATOR.to_string(),
            publisher_url: DEFAULT_WALRUS_PUBLISHER.to_string(),
            epochs: Some(DEFAULT_EPOCHS),
        }
    }
}

impl WalrusOptions {
    /// Builds options, falling back to the testnet endpoints.
    ///
    /// `temp` stores blobs for a single epoch (~24 hours) and overrides `epochs`.
    pub fn new(
        aggregator_url: Option<String>,
        publisher_url: Option<String>,
        epochs: Option<u64>,
        temp: bool,
    ) -> Self {
        Self {
            aggregator_url: aggregator_url
                .unwrap_or_else(|| DEFAULT_WALRUS_AGGREGATOR.to_string()),
            publisher_url: publisher_url
                .unwrap_or_else(|| DEFAULT_WALRUS_PUBLISHER.to_string()),
            epochs: if temp {
                Some(TEMP_EPOCHS)
            } else {
                epochs.or(Some(DEFAULT_EPOCHS))
            },
        }
    }
}

/// Object store backed by Walrus decentralized storage.
///
/// Walrus is content-addressed: the key is only used for logging and the
/// locator is the blob id.
pub struct WalrusStore {
    client: WalrusClient,
    options: WalrusOptions,
}

impl WalrusStore {
    pub fn new(options: WalrusOptions) -> Result<Self> {
        let client = WalrusClient::new(&options.aggregator_url, &options.publisher_url)
            .map_err(|e| SnapError::Upload(format!("Failed to create Walrus client: {}", e)))?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &WalrusOptions {
        &self.options
    }
}

#[async_trait]
impl ObjectStore for WalrusStore {
    async fn put(&self, key: &str, blob: Vec<u8>, content_type: &str) -> Result<Locator> {
        debug!(key, content_type, size = blob.len(), epochs = ?self.options.epochs, "storing on Walrus");

        // Deletable, so a later cleanup command can remove blobs
        let store_result = self
            .client
            .store_blob(blob, self.options.epochs, Some(true), None, None)
            .await
            .map_err(|e| SnapError::Upload(format!("Failed to store blob: {}", e)))?;

        blob_locator(store_result)
    }

    fn public_url_for(&self, locator: &Locator) -> String {
        build_walrus_access_url(&self.options.aggregator_url, locator.as_str())
    }

    fn name(&self) -> &'static str {
        "walrus"
    }
}

/// Blob id of a store response. Identical content stored earlier comes back
/// as already certified and resolves to the same blob.
fn blob_locator(result: BlobStoreResult) -> Result<Locator> {
    match (result.newly_created, result.already_certified) {
        (Some(newly_created), _) => Ok(Locator::new(newly_created.blob_object.blob_id)),
        (None, Some(certified)) => {
            debug!(blob_id = %certified.blob_id, end_epoch = certified.end_epoch, "blob already certified");
            Ok(Locator::new(certified.blob_id))
        }
        (None, None) => Err(SnapError::Upload(
            "Walrus returned neither a new nor a certified blob".to_string(),
        )),
    }
}

/// `{aggregator}/v1/blobs/{blob_id}`
pub fn build_walrus_access_url(aggregator_url: &str, blob_id: &str) -> String {
    join_url(aggregator_url, &format!("{}{}", WALRUS_BLOB_PATH, blob_id))
}

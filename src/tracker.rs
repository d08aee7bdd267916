//! Observable, ordered collection of image items.

use crate::constants::UPDATE_CHANNEL_CAPACITY;
use crate::item::{ImageItem, ItemId};
use tokio::sync::{broadcast, RwLock};

/// Change notification published on every item mutation
#[derive(Debug, Clone)]
pub enum ItemEvent {
    /// Snapshot of an item after it was registered or changed
    Changed(ImageItem),
    /// The whole collection was discarded
    Cleared,
}

/// State container for the items of every submitted batch.
///
/// Items keep their registration order. Readers poll with [`ItemTracker::snapshot`]
/// or follow changes through [`ItemTracker::subscribe`].
pub struct ItemTracker {
    items: RwLock<Vec<ImageItem>>,
    sender: broadcast::Sender<ItemEvent>,
}

impl ItemTracker {
    pub fn new() -> Self {
        Self::with_capacity(UPDATE_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            items: RwLock::new(Vec::new()),
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: ItemEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Appends a new item and returns its id.
    pub async fn register(&self, item: ImageItem) -> ItemId {
        let id = item.id();
        self.items.write().await.push(item.clone());
        self.publish(ItemEvent::Changed(item));
        id
    }

    /// Stores the new state of an item and publishes it.
    ///
    /// Returns `false` without publishing when the item is no longer tracked,
    /// e.g. after [`ItemTracker::clear`].
    pub async fn sync(&self, item: &ImageItem) -> bool {
        {
            let mut items = self.items.write().await;
            match items.iter_mut().find(|tracked| tracked.id() == item.id()) {
                Some(tracked) => *tracked = item.clone(),
                None => return false,
            }
        }
        self.publish(ItemEvent::Changed(item.clone()));
        true
    }

    pub async fn get(&self, id: ItemId) -> Option<ImageItem> {
        self.items.read().await.iter().find(|item| item.id() == id).cloned()
    }

    pub async fn snapshot(&self) -> Vec<ImageItem> {
        self.items.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Discards every item. Remote objects are not affected.
    pub async fn clear(&self) {
        self.items.write().await.clear();
        self.publish(ItemEvent::Cleared);
    }
}

impl Default for ItemTracker {
    fn default() -> Self {
        Self::new()
    }
}

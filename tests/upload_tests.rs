mod common;

use common::*;
use image::GenericImageView;
use snapurl::batch::SourceFile;
use snapurl::constants::{CAPTION_PLACEHOLDER, SMALL_PASSTHROUGH_BELOW};
use snapurl::item::{ItemId, ItemStatus};
use snapurl::metadata::MetadataPolicy;
use snapurl::profile::{CompressionProfile, ProfilePreset};
use snapurl::tracker::ItemEvent;
use snapurl::upload::Uploader;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

fn uploader(store: &Arc<MemoryStore>) -> Uploader {
    Uploader::new(store.clone())
}

fn drain_statuses(rx: &mut broadcast::Receiver<ItemEvent>, id: ItemId) -> Vec<ItemStatus> {
    let mut statuses = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ItemEvent::Changed(item) = event {
            if item.id() == id {
                statuses.push(item.status());
            }
        }
    }
    statuses
}

#[tokio::test]
async fn test_batch_creates_one_item_per_file_in_order() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store);
    let files = vec![
        SourceFile::new("first.png", gradient_png(20, 10)),
        SourceFile::new("second.png", gradient_png(30, 10)),
        SourceFile::new("third.png", gradient_png(40, 10)),
    ];

    let summary = uploader
        .submit_batch(files, &CompressionProfile::passthrough())
        .await;

    let names: Vec<_> = summary.items.iter().map(|i| i.original_name()).collect();
    assert_eq!(names, vec!["first.png", "second.png", "third.png"]);

    let ids: HashSet<_> = summary.items.iter().map(|i| i.id()).collect();
    assert_eq!(ids.len(), 3);

    let items = uploader.items().await;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].original_name(), "first.png");
    for item in &items {
        assert_eq!(item.status(), ItemStatus::Completed);
        assert!(item.public_url().is_some());
    }
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_corrupt_file_goes_pending_processing_failed() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store);
    let mut rx = uploader.subscribe();

    let summary = uploader
        .submit_batch(
            vec![SourceFile::new("broken.jpg", corrupt_bytes())],
            &ProfilePreset::Balanced.profile(),
        )
        .await;

    assert_eq!(summary.total(), 1);
    let item = &summary.items[0];
    assert_eq!(item.status(), ItemStatus::Failed);
    assert!(item.public_url().is_none());
    assert!(item.error().is_some());
    assert_eq!(item.mime_type(), "application/octet-stream");

    assert_eq!(
        drain_statuses(&mut rx, item.id()),
        vec![ItemStatus::Pending, ItemStatus::Processing, ItemStatus::Failed]
    );
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_failure_does_not_block_later_items() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store);
    let files = vec![
        SourceFile::new("a.png", gradient_png(16, 16)),
        SourceFile::new("b.png", corrupt_bytes()),
        SourceFile::new("c.png", gradient_png(16, 16)),
    ];

    let summary = uploader
        .submit_batch(files, &ProfilePreset::Balanced.profile())
        .await;

    let statuses: Vec<_> = summary.items.iter().map(|i| i.status()).collect();
    assert_eq!(
        statuses,
        vec![ItemStatus::Completed, ItemStatus::Failed, ItemStatus::Completed]
    );
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.public_urls().len(), 2);
}

#[tokio::test]
async fn test_completed_iff_url_set() {
    let store = Arc::new(MemoryStore::failing_on("rejected"));
    let uploader = uploader(&store);
    let files = vec![
        SourceFile::new("kept.png", gradient_png(8, 8)),
        SourceFile::new("rejected.png", gradient_png(8, 8)),
    ];

    let summary = uploader
        .submit_batch(files, &CompressionProfile::passthrough())
        .await;

    for item in &summary.items {
        assert_eq!(
            item.status() == ItemStatus::Completed,
            item.public_url().is_some()
        );
    }
    let rejected = &summary.items[1];
    assert_eq!(rejected.status(), ItemStatus::Failed);
    assert!(rejected.error().unwrap().contains("Upload failed"));
}

#[tokio::test]
async fn test_small_profile_scenario() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store);
    let profile = ProfilePreset::Small.profile();

    // Roughly 50KB, 500KB and 5MB of incompressible pixels
    let sources = vec![
        SourceFile::new("fifty.png", noise_png(130, 130)),
        SourceFile::new("five-hundred.png", noise_png(410, 410)),
        SourceFile::new("five-mega.png", noise_png(1300, 1300)),
    ];
    for source in &sources {
        assert!(source.size() > SMALL_PASSTHROUGH_BELOW);
    }

    let summary = uploader.submit_batch(sources, &profile).await;

    assert_eq!(summary.completed(), 3);
    let keys: HashSet<_> = summary
        .items
        .iter()
        .map(|i| i.object_key().unwrap().to_string())
        .collect();
    assert_eq!(keys.len(), 3);

    for item in &summary.items {
        assert_eq!(item.mime_type(), "image/jpeg");
        let key = item.object_key().unwrap();
        assert!(key.ends_with(".jpg"), "{}", key);

        let (bytes, content_type) = store.get(key).unwrap();
        assert_eq!(content_type, "image/jpeg");
        let decoded = image::load_from_memory(&bytes).unwrap();
        let (w, h) = decoded.dimensions();
        assert!(w.max(h) <= 720);
    }

    let largest = store.get(summary.items[2].object_key().unwrap()).unwrap().0;
    let (w, h) = image::load_from_memory(&largest).unwrap().dimensions();
    assert_eq!((w, h), (720, 720));
}

#[tokio::test]
async fn test_clear_all_keeps_stored_objects() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store);
    let mut rx = uploader.subscribe();

    let summary = uploader
        .submit_batch(
            vec![
                SourceFile::new("one.png", gradient_png(10, 10)),
                SourceFile::new("two.png", gradient_png(10, 10)),
            ],
            &CompressionProfile::passthrough(),
        )
        .await;
    assert_eq!(summary.completed(), 2);

    uploader.clear_all().await;

    assert!(uploader.items().await.is_empty());
    assert_eq!(store.len(), 2);

    let mut saw_cleared = false;
    while let Ok(event) = rx.try_recv() {
        saw_cleared |= matches!(event, ItemEvent::Cleared);
    }
    assert!(saw_cleared);
}

#[tokio::test]
async fn test_clear_all_mid_batch_keeps_uploading() {
    let store = Arc::new(MemoryStore::slow(Duration::from_millis(100)));
    let uploader = Arc::new(uploader(&store));
    let mut rx = uploader.subscribe();

    let files = vec![
        SourceFile::new("one.png", gradient_png(10, 10)),
        SourceFile::new("two.png", gradient_png(10, 10)),
        SourceFile::new("three.png", gradient_png(10, 10)),
    ];
    let batch = {
        let uploader = Arc::clone(&uploader);
        tokio::spawn(async move {
            uploader
                .submit_batch(files, &CompressionProfile::passthrough())
                .await
        })
    };

    // Clear as soon as the first item is done
    loop {
        match rx.recv().await.unwrap() {
            ItemEvent::Changed(item) if item.status() == ItemStatus::Completed => break,
            _ => {}
        }
    }
    uploader.clear_all().await;

    let summary = batch.await.unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.completed(), 3);
    let names: Vec<_> = summary.items.iter().map(|i| i.original_name()).collect();
    assert_eq!(names, vec!["one.png", "two.png", "three.png"]);
    for item in &summary.items {
        let (_, content_type) = store.get(item.object_key().unwrap()).unwrap();
        assert_eq!(content_type, "image/png");
    }

    // Cleared items are neither re-added nor reported
    assert!(uploader.items().await.is_empty());
    let mut after_clear = Vec::new();
    let mut cleared = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            ItemEvent::Cleared => cleared = true,
            ItemEvent::Changed(item) if cleared => after_clear.push(item),
            ItemEvent::Changed(_) => {}
        }
    }
    assert!(cleared);
    assert!(after_clear.is_empty());
}

#[tokio::test]
async fn test_later_batches_append_after_earlier_items() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store);
    let profile = CompressionProfile::passthrough();

    uploader
        .submit_batch(vec![SourceFile::new("old.png", gradient_png(4, 4))], &profile)
        .await;
    uploader
        .submit_batch(vec![SourceFile::new("new.png", gradient_png(4, 4))], &profile)
        .await;

    let names: Vec<_> = uploader
        .items()
        .await
        .iter()
        .map(|i| i.original_name().to_string())
        .collect();
    assert_eq!(names, vec!["old.png", "new.png"]);
}

#[tokio::test]
async fn test_metadata_recorded_for_completed_items() {
    let store = Arc::new(MemoryStore::new());
    let metadata = Arc::new(RecordingMetadataStore::default());
    let uploader = uploader(&store).with_metadata(metadata.clone());

    let summary = uploader
        .submit_batch(
            vec![
                SourceFile::new("ok.png", gradient_png(8, 8)),
                SourceFile::new("bad.png", corrupt_bytes()),
            ],
            &CompressionProfile::passthrough(),
        )
        .await;

    let records = metadata.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name, "ok.png");
    assert_eq!(Some(records[0].url.as_str()), summary.items[0].public_url());
    assert_eq!(records[0].mime_type, "image/png");
    assert!(records[0].caption.is_none());
}

#[tokio::test]
async fn test_required_metadata_failure_fails_item() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store).with_metadata(Arc::new(FailingMetadataStore));

    let summary = uploader
        .submit_batch(
            vec![SourceFile::new("a.png", gradient_png(8, 8))],
            &CompressionProfile::passthrough(),
        )
        .await;

    let item = &summary.items[0];
    assert_eq!(item.status(), ItemStatus::Failed);
    assert!(item.public_url().is_none());
    assert!(item.error().unwrap().contains("metadata"));
}

#[tokio::test]
async fn test_best_effort_metadata_failure_keeps_item() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store)
        .with_metadata(Arc::new(FailingMetadataStore))
        .with_metadata_policy(MetadataPolicy::BestEffort);

    let summary = uploader
        .submit_batch(
            vec![SourceFile::new("a.png", gradient_png(8, 8))],
            &CompressionProfile::passthrough(),
        )
        .await;

    assert_eq!(summary.items[0].status(), ItemStatus::Completed);
    assert!(summary.items[0].public_url().is_some());
}

#[tokio::test]
async fn test_captions_flow_into_items_and_metadata() {
    let store = Arc::new(MemoryStore::new());
    let metadata = Arc::new(RecordingMetadataStore::default());
    let uploader = uploader(&store)
        .with_metadata(metadata.clone())
        .with_captioner(Arc::new(FixedCaptioner("  A small gradient.  ")));

    let summary = uploader
        .submit_batch(
            vec![SourceFile::new("a.png", gradient_png(8, 8))],
            &CompressionProfile::passthrough(),
        )
        .await;

    assert_eq!(summary.items[0].caption(), Some("A small gradient."));
    let records = metadata.records.lock().unwrap();
    assert_eq!(records[0].caption.as_deref(), Some("A small gradient."));
}

#[tokio::test]
async fn test_failed_caption_uses_placeholder() {
    let store = Arc::new(MemoryStore::new());
    let uploader = uploader(&store).with_captioner(Arc::new(FailingCaptioner));

    let summary = uploader
        .submit_batch(
            vec![SourceFile::new("a.png", gradient_png(8, 8))],
            &CompressionProfile::passthrough(),
        )
        .await;

    assert_eq!(summary.items[0].status(), ItemStatus::Completed);
    assert_eq!(summary.items[0].caption(), Some(CAPTION_PLACEHOLDER));
}

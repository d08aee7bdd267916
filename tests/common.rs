#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use snapurl::caption::Captioner;
use snapurl::error::{Result, SnapError};
use snapurl::metadata::{MetadataRecord, MetadataStore};
use snapurl::storage::{Locator, ObjectStore};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory object store; keys containing `fail_on` are rejected.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    order: Mutex<Vec<String>>,
    fail_on: Option<String>,
    delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(fragment: &str) -> Self {
        Self {
            fail_on: Some(fragment.to_string()),
            ..Self::default()
        }
    }

    /// Store whose every `put` takes `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, blob: Vec<u8>, content_type: &str) -> Result<Locator> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(fragment) = &self.fail_on {
            if key.contains(fragment.as_str()) {
                return Err(SnapError::Upload(format!("rejected {}", key)));
            }
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            return Err(SnapError::Upload(format!("duplicate key {}", key)));
        }
        objects.insert(key.to_string(), (blob, content_type.to_string()));
        self.order.lock().unwrap().push(key.to_string());
        Ok(Locator::new(key))
    }

    fn public_url_for(&self, locator: &Locator) -> String {
        format!("https://cdn.test/{}", locator)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Default)]
pub struct RecordingMetadataStore {
    pub records: Mutex<Vec<MetadataRecord>>,
}

#[async_trait]
impl MetadataStore for RecordingMetadataStore {
    async fn insert(&self, record: &MetadataRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingMetadataStore;

#[async_trait]
impl MetadataStore for FailingMetadataStore {
    async fn insert(&self, _record: &MetadataRecord) -> Result<()> {
        Err(SnapError::Metadata("database unavailable".to_string()))
    }
}

pub struct FixedCaptioner(pub &'static str);

#[async_trait]
impl Captioner for FixedCaptioner {
    async fn describe(&self, _image: &[u8], _mime_type: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

pub struct FailingCaptioner;

#[async_trait]
impl Captioner for FailingCaptioner {
    async fn describe(&self, _image: &[u8], _mime_type: &str) -> Result<String> {
        Err(SnapError::Upload("caption service down".to_string()))
    }
}

/// PNG filled with pseudo-random pixels; the file size stays close to
/// `width * height * 3` because noise does not deflate.
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491 ^ width.wrapping_mul(31) ^ height;
    let img = RgbImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [_, r, g, b] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    encode(&image::DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    encode(&image::DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

pub fn encode(img: &image::DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn corrupt_bytes() -> Vec<u8> {
    b"this is definitely not an image".to_vec()
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

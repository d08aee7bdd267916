pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;

/// Largest source file accepted into a batch (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * MIB;
pub const MAX_BATCH_FILES: usize = 10_000;

pub const MIN_QUALITY: f32 = 0.0;
pub const MAX_QUALITY: f32 = 1.0;

// Profile presets: (max side, quality, passthrough threshold)
pub const TINY_MAX_DIMENSION: u32 = 480;
pub const TINY_QUALITY: f32 = 0.30;
pub const TINY_PASSTHROUGH_BELOW: u64 = 16 * KIB;

pub const SMALL_MAX_DIMENSION: u32 = 720;
pub const SMALL_QUALITY: f32 = 0.38;
pub const SMALL_PASSTHROUGH_BELOW: u64 = 32 * KIB;

pub const BALANCED_MAX_DIMENSION: u32 = 2000;
pub const BALANCED_QUALITY: f32 = 0.80;
pub const BALANCED_PASSTHROUGH_BELOW: u64 = 200 * KIB;

pub const WEB_MAX_DIMENSION: u32 = 1600;
pub const WEB_QUALITY: f32 = 0.80;
pub const WEB_PASSTHROUGH_BELOW: u64 = 200 * KIB;

// PNG optimization levels, chosen from the profile quality
pub const OXIPNG_PRESET: u8 = 4;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const ZOPFLI_QUALITY_THRESHOLD: f32 = 0.9;
pub const HIGH_PNG_QUALITY_THRESHOLD: f32 = 0.7;

pub const DEFAULT_EPOCHS: u64 = 10;
pub const TEMP_EPOCHS: u64 = 1;

pub const DEFAULT_WALRUS_AGGREGATOR: &str = "https://aggregator.walrus-testnet.walrus.space";
pub const DEFAULT_WALRUS_PUBLISHER: &str = "https://publisher.walrus-testnet.walrus.space";
pub const WALRUS_BLOB_PATH: &str = "/v1/blobs/";

/// Capacity of the item update channel before slow subscribers start lagging
pub const UPDATE_CHANNEL_CAPACITY: usize = 256;

pub const CAPTION_PLACEHOLDER: &str = "Analysis failed.";
pub const FALLBACK_STEM: &str = "image";
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "avif",
];

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

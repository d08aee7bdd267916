pub mod batch;
pub mod caption;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod item;
pub mod logger;
pub mod metadata;
pub mod naming;
pub mod processing;
pub mod profile;
pub mod storage;
pub mod tracker;
pub mod upload;
pub mod utils;
pub mod validation;
pub mod walrus;

pub use batch::{collect_image_files, load_sources, BatchSummary, SourceFile};
pub use caption::Captioner;
pub use clipboard::{Clipboard, SystemClipboard};
pub use config::StoreConfig;
pub use error::{Result, SnapError};
pub use formats::OutputFormat;
pub use item::{ImageItem, ItemId, ItemStatus};
pub use metadata::{JsonlMetadataStore, MetadataPolicy, MetadataRecord, MetadataStore};
pub use processing::{compress, target_dimensions, CompressedImage, CompressionOutcome};
pub use profile::{CompressionProfile, ProfilePreset};
pub use storage::{DirectoryStore, Locator, ObjectStore};
pub use tracker::{ItemEvent, ItemTracker};
pub use upload::Uploader;
pub use walrus::{WalrusOptions, WalrusStore};

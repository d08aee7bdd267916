use crate::item::ItemStatus;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Failed to record metadata: {0}")]
    Metadata(String),

    #[error("Invalid quality value: {0}. Must be between 0.0 and 1.0")]
    InvalidQuality(f32),

    #[error("Invalid maximum dimension: {0}. Must be greater than zero")]
    InvalidDimension(u32),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Batch file count limit exceeded: {0} files, maximum allowed {1}")]
    BatchFileLimitExceeded(usize, usize),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: ItemStatus, to: ItemStatus },

    #[error("Background task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SnapError>;

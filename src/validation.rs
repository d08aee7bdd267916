use crate::constants::{MAX_FILE_SIZE, SUPPORTED_IMAGE_EXTENSIONS};
use crate::error::{SnapError, Result};
use std::path::Path;
use tokio::fs;

/// Validate an input file before it joins a batch.
///
/// Returns the file size in bytes.
pub async fn validate_input_path(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|_| SnapError::FileNotFound(path.to_path_buf()))?;

    if !metadata.is_file() {
        return Err(SnapError::UnsupportedFormat(format!(
            "{} is not a file",
            path.display()
        )));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(SnapError::FileTooLarge(metadata.len(), MAX_FILE_SIZE));
    }

    Ok(metadata.len())
}

/// Check if the file extension indicates it might be an image
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

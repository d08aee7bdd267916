use crate::constants::MAX_BATCH_FILES;
use crate::error::{SnapError, Result};
use crate::item::{ImageItem, ItemStatus};
use crate::validation::{is_image_file, validate_input_path};
use glob::glob;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use walkdir::WalkDir;

/// One image submitted for upload
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk after validating it.
    pub async fn read(path: &Path) -> Result<Self> {
        validate_input_path(path).await?;
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reads every path in order. Unreadable files are reported and left out.
pub async fn load_sources(paths: &[PathBuf]) -> (Vec<SourceFile>, Vec<(PathBuf, SnapError)>) {
    let mut sources = Vec::with_capacity(paths.len());
    let mut rejected = Vec::new();

    for path in paths {
        match SourceFile::read(path).await {
            Ok(source) => sources.push(source),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                rejected.push((path.clone(), e));
            }
        }
    }

    (sources, rejected)
}

/// Expands files, directories and glob patterns into image paths.
///
/// Order follows the inputs; directory entries are sorted by name and hidden
/// entries are skipped.
pub fn collect_image_files(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();

    for input in inputs {
        let input_path = Path::new(input);

        if input_path.is_file() {
            // Explicitly named files are taken as-is; the decoder decides later
            image_files.push(input_path.to_path_buf());
        } else if input_path.is_dir() {
            let walker = if recursive {
                WalkDir::new(input_path).sort_by_file_name()
            } else {
                WalkDir::new(input_path).max_depth(1).sort_by_file_name()
            };

            for entry in walker
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && is_image_file(path) {
                    image_files.push(path.to_path_buf());
                }
            }
        } else if let Ok(pattern) = glob(input) {
            for entry in pattern.flatten() {
                if entry.is_file() && is_image_file(&entry) {
                    image_files.push(entry);
                }
            }
        } else {
            return Err(SnapError::NoImageFilesFound(input.to_string()));
        }
    }

    if image_files.len() > MAX_BATCH_FILES {
        return Err(SnapError::BatchFileLimitExceeded(
            image_files.len(),
            MAX_BATCH_FILES,
        ));
    }

    Ok(image_files)
}

/// Outcome of one submitted batch
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Final state of every item of this batch, in submission order
    pub items: Vec<ImageItem>,
    /// Source bytes of the completed items
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn completed(&self) -> usize {
        self.count(ItemStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(ItemStatus::Failed)
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status() == status).count()
    }

    pub fn public_urls(&self) -> Vec<&str> {
        self.items.iter().filter_map(|item| item.public_url()).collect()
    }
}

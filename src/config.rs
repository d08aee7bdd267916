//! Turns command line settings into profiles and collaborators.

use crate::cli::{ProfileArgs, StoreKind};
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::profile::CompressionProfile;
use crate::storage::{DirectoryStore, ObjectStore};
use crate::walrus::{WalrusOptions, WalrusStore};
use std::path::PathBuf;
use std::sync::Arc;

impl ProfileArgs {
    /// The selected preset with any per-field overrides applied
    pub fn resolve(&self) -> Result<CompressionProfile> {
        let base = self.profile.profile();
        if self.max_dimension.is_none() && self.quality.is_none() && self.format.is_none() {
            return Ok(base);
        }

        let format = self
            .format
            .as_deref()
            .map(str::parse::<OutputFormat>)
            .transpose()?;
        base.with_overrides(self.max_dimension, self.quality, format)
    }
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Directory {
        root: PathBuf,
        public_base_url: Option<String>,
    },
    Walrus(WalrusOptions),
}

impl StoreConfig {
    pub fn new(
        kind: StoreKind,
        out_dir: PathBuf,
        public_base_url: Option<String>,
        walrus: WalrusOptions,
    ) -> Self {
        match kind {
            StoreKind::Dir => StoreConfig::Directory {
                root: out_dir,
                public_base_url,
            },
            StoreKind::Walrus => StoreConfig::Walrus(walrus),
        }
    }

    pub fn build_store(&self) -> Result<Arc<dyn ObjectStore>> {
        match self {
            StoreConfig::Directory {
                root,
                public_base_url,
            } => Ok(Arc::new(DirectoryStore::new(
                root.clone(),
                public_base_url.clone(),
            ))),
            StoreConfig::Walrus(options) => Ok(Arc::new(WalrusStore::new(options.clone())?)),
        }
    }

    /// Human readable target for status output
    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Directory { root, .. } => format!("directory {}", root.display()),
            StoreConfig::Walrus(options) => format!("walrus {}", options.publisher_url),
        }
    }
}

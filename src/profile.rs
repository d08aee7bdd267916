use crate::constants::{
    BALANCED_MAX_DIMENSION, BALANCED_PASSTHROUGH_BELOW, BALANCED_QUALITY, MAX_QUALITY,
    MIN_QUALITY, SMALL_MAX_DIMENSION, SMALL_PASSTHROUGH_BELOW, SMALL_QUALITY,
    TINY_MAX_DIMENSION, TINY_PASSTHROUGH_BELOW, TINY_QUALITY, WEB_MAX_DIMENSION,
    WEB_PASSTHROUGH_BELOW, WEB_QUALITY,
};
use crate::error::{SnapError, Result};
use crate::formats::OutputFormat;
use clap::ValueEnum;
use serde::Serialize;

/// Named bundle of compression parameters selected for a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionProfile {
    name: String,
    max_dimension: u32,
    quality: f32,
    output_format: OutputFormat,
    passthrough_below: u64,
}

impl CompressionProfile {
    /// Builds a custom profile.
    ///
    /// # Arguments
    /// * `max_dimension` - Longest-side cap in pixels, must be non-zero
    /// * `quality` - Encoder quality factor in `[0, 1]`
    /// * `output_format` - Target encoding, or passthrough
    /// * `passthrough_below` - Sources at or below this many bytes are uploaded untouched
    pub fn new(
        name: impl Into<String>,
        max_dimension: u32,
        quality: f32,
        output_format: OutputFormat,
        passthrough_below: u64,
    ) -> Result<Self> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(SnapError::InvalidQuality(quality));
        }
        if max_dimension == 0 {
            return Err(SnapError::InvalidDimension(max_dimension));
        }

        Ok(Self {
            name: name.into(),
            max_dimension,
            quality,
            output_format,
            passthrough_below,
        })
    }

    /// Profile that never recompresses.
    pub fn passthrough() -> Self {
        Self {
            name: "original".to_string(),
            max_dimension: u32::MAX,
            quality: MAX_QUALITY,
            output_format: OutputFormat::Passthrough,
            passthrough_below: u64::MAX,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn passthrough_below(&self) -> u64 {
        self.passthrough_below
    }

    pub fn is_passthrough(&self) -> bool {
        self.output_format.is_passthrough()
    }

    /// Whether a source of `size` bytes skips recompression under this profile
    pub fn skips(&self, size: u64) -> bool {
        self.is_passthrough() || size <= self.passthrough_below
    }

    /// Quality on the 1-100 scale used by the JPEG encoder
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Returns a copy with selected fields overridden, re-validated.
    pub fn with_overrides(
        &self,
        max_dimension: Option<u32>,
        quality: Option<f32>,
        output_format: Option<OutputFormat>,
    ) -> Result<Self> {
        let output_format = output_format.unwrap_or(self.output_format);
        let passthrough_below = if self.is_passthrough() && !output_format.is_passthrough() {
            0
        } else {
            self.passthrough_below
        };
        Self::new(
            format!("{}+custom", self.name),
            max_dimension.unwrap_or(self.max_dimension),
            quality.unwrap_or(self.quality),
            output_format,
            passthrough_below,
        )
    }
}

/// Built-in profiles, from smallest output to untouched originals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProfilePreset {
    /// Thumbnails and chat previews
    Tiny,
    /// Very small web images
    Small,
    /// Keep files near 200KB while staying sharp
    #[default]
    Balanced,
    /// WebP for modern browsers
    Web,
    /// Upload originals without recompression
    Original,
}

impl ProfilePreset {
    pub fn all() -> [ProfilePreset; 5] {
        [
            ProfilePreset::Tiny,
            ProfilePreset::Small,
            ProfilePreset::Balanced,
            ProfilePreset::Web,
            ProfilePreset::Original,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProfilePreset::Tiny => "tiny",
            ProfilePreset::Small => "small",
            ProfilePreset::Balanced => "balanced",
            ProfilePreset::Web => "web",
            ProfilePreset::Original => "original",
        }
    }

    pub fn profile(&self) -> CompressionProfile {
        let (max_dimension, quality, output_format, passthrough_below) = match self {
            ProfilePreset::Tiny => (
                TINY_MAX_DIMENSION,
                TINY_QUALITY,
                OutputFormat::Jpeg,
                TINY_PASSTHROUGH_BELOW,
            ),
            ProfilePreset::Small => (
                SMALL_MAX_DIMENSION,
                SMALL_QUALITY,
                OutputFormat::Jpeg,
                SMALL_PASSTHROUGH_BELOW,
            ),
            ProfilePreset::Balanced => (
                BALANCED_MAX_DIMENSION,
                BALANCED_QUALITY,
                OutputFormat::Jpeg,
                BALANCED_PASSTHROUGH_BELOW,
            ),
            ProfilePreset::Web => (
                WEB_MAX_DIMENSION,
                WEB_QUALITY,
                OutputFormat::WebP,
                WEB_PASSTHROUGH_BELOW,
            ),
            ProfilePreset::Original => return CompressionProfile::passthrough(),
        };

        CompressionProfile {
            name: self.name().to_string(),
            max_dimension,
            quality,
            output_format,
            passthrough_below,
        }
    }
}

//! Output format selection and source format sniffing.

use crate::constants::FALLBACK_MIME_TYPE;
use crate::error::{SnapError, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target encoding of a compression profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Upload the source bytes as they are
    Passthrough,
    /// JPEG format with lossy compression
    Jpeg,
    /// PNG format with lossless compression
    Png,
    /// WebP format (lossless encoder)
    WebP,
}

impl OutputFormat {
    /// Returns the file extension for this format, `None` for passthrough
    pub fn extension(&self) -> Option<&'static str> {
        self.to_image_format().map(extension_for)
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> Option<ImageFormat> {
        match self {
            OutputFormat::Passthrough => None,
            OutputFormat::Jpeg => Some(ImageFormat::Jpeg),
            OutputFormat::Png => Some(ImageFormat::Png),
            OutputFormat::WebP => Some(ImageFormat::WebP),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, OutputFormat::Passthrough)
    }

    /// Get format names for CLI help text
    pub fn format_names() -> Vec<&'static str> {
        vec!["passthrough", "jpeg", "png", "webp"]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Passthrough => "passthrough",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = SnapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "passthrough" | "original" | "none" => Ok(OutputFormat::Passthrough),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "heic" | "heif" | "jxl" | "jpegxl" | "avif" => Err(SnapError::UnsupportedFormat(
                format!("{} output is not supported. Use jpeg or webp for web delivery", s),
            )),
            _ => Err(SnapError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Detects the image format from the leading magic bytes.
///
/// Anything the image crate cannot recognize is treated as undecodable,
/// so corrupt uploads fail early even when no re-encode is planned.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(SnapError::Decode("empty file".to_string()));
    }
    image::guess_format(bytes)
        .map_err(|e| SnapError::Decode(format!("unrecognized image data: {}", e)))
}

/// Canonical extension used when naming stored objects
pub fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        other => other.extensions_str().first().copied().unwrap_or("bin"),
    }
}

pub fn mime_type_for(format: ImageFormat) -> &'static str {
    let mime = format.to_mime_type();
    if mime.is_empty() {
        FALLBACK_MIME_TYPE
    } else {
        mime
    }
}

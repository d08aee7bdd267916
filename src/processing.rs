use crate::constants::{
    HIGH_PNG_QUALITY_THRESHOLD, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, OXIPNG_PRESET,
    ZOPFLI_ITERATIONS, ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{SnapError, Result};
use crate::formats::{extension_for, mime_type_for, sniff_format, OutputFormat};
use crate::profile::CompressionProfile;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use std::io::Cursor;
use std::num::NonZeroU8;
use tracing::{debug, warn};

/// How the compressor arrived at its output bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOutcome {
    /// Source returned untouched (passthrough profile or below threshold)
    Passthrough,
    /// Decoded, scaled and re-encoded
    Reencoded,
    /// Re-encoding produced nothing usable, source returned untouched
    Fallback,
}

/// Result of running one source image through the compressor
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub original_size: u64,
    /// Output pixel dimensions, known only when the source was decoded
    pub dimensions: Option<(u32, u32)>,
    pub outcome: CompressionOutcome,
}

impl CompressedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type_for(self.format)
    }

    pub fn extension(&self) -> &'static str {
        extension_for(self.format)
    }

    pub fn is_reencoded(&self) -> bool {
        self.outcome == CompressionOutcome::Reencoded
    }
}

/// Computes the scaled size that fits `max_dimension` on the longest side.
///
/// Never upscales; each side is rounded and kept at least one pixel.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 || longest <= max_dimension {
        return (width, height);
    }

    let scale = max_dimension as f64 / longest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Downsamples the image in place so it fits the profile's maximum dimension.
pub fn resize_image(img: &mut DynamicImage, profile: &CompressionProfile) {
    let (width, height) = img.dimensions();
    let (target_w, target_h) = target_dimensions(width, height, profile.max_dimension());
    if (target_w, target_h) != (width, height) {
        debug!(width, height, target_w, target_h, "resizing");
        *img = img.resize_exact(target_w, target_h, FilterType::Lanczos3);
    }
}

/// Compresses one source image according to `profile`.
///
/// # Arguments
/// * `source` - Encoded bytes of the original image
/// * `profile` - Compression profile for the current batch
///
/// # Returns
/// * `Ok(CompressedImage)` - The bytes to upload and their format
/// * `Err(SnapError::Decode)` - If the source is not a readable image
///
/// Encoding failures never surface: the source bytes are returned instead.
pub async fn compress(source: Vec<u8>, profile: &CompressionProfile) -> Result<CompressedImage> {
    let original_size = source.len() as u64;
    let source_format = sniff_format(&source)?;

    if profile.skips(original_size) {
        debug!(size = original_size, profile = profile.name(), "passthrough");
        return Ok(CompressedImage {
            bytes: source,
            format: source_format,
            original_size,
            dimensions: None,
            outcome: CompressionOutcome::Passthrough,
        });
    }

    let (source, decoded) = tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory_with_format(&source, source_format);
        (source, decoded)
    })
    .await?;
    let mut img = decoded.map_err(|e| SnapError::Decode(e.to_string()))?;
    debug!(width = img.width(), height = img.height(), "decoded");

    let owned_profile = profile.clone();
    let encoded = tokio::task::spawn_blocking(move || {
        resize_image(&mut img, &owned_profile);
        let dimensions = img.dimensions();
        encode_image(&img, &owned_profile).map(|(bytes, format)| (bytes, format, dimensions))
    })
    .await?;

    match encoded {
        Ok((bytes, format, dimensions)) if !bytes.is_empty() => {
            debug!(size = bytes.len(), ?format, "encoded");
            Ok(CompressedImage {
                bytes,
                format,
                original_size,
                dimensions: Some(dimensions),
                outcome: CompressionOutcome::Reencoded,
            })
        }
        Ok(_) => {
            warn!("encoder produced no output, uploading the original");
            Ok(fallback(source, source_format))
        }
        Err(e) => {
            warn!(error = %e, "re-encoding failed, uploading the original");
            Ok(fallback(source, source_format))
        }
    }
}

fn fallback(source: Vec<u8>, format: ImageFormat) -> CompressedImage {
    CompressedImage {
        original_size: source.len() as u64,
        bytes: source,
        format,
        dimensions: None,
        outcome: CompressionOutcome::Fallback,
    }
}

/// Encodes a decoded image in the profile's output format.
pub fn encode_image(
    img: &DynamicImage,
    profile: &CompressionProfile,
) -> Result<(Vec<u8>, ImageFormat)> {
    let mut buf = Vec::new();

    match profile.output_format() {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, profile.jpeg_quality())
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| SnapError::Encode(e.to_string()))?;
            Ok((buf, ImageFormat::Jpeg))
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| SnapError::Encode(e.to_string()))?;
            let optimized = oxipng::optimize_from_memory(&buf, &png_options(profile.quality()))
                .map_err(|e| SnapError::Encode(format!("PNG optimization: {}", e)))?;
            Ok((optimized, ImageFormat::Png))
        }
        OutputFormat::WebP => {
            let rgba = img.to_rgba8();
            WebPEncoder::new_lossless(&mut buf)
                .encode(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                .map_err(|e| SnapError::Encode(e.to_string()))?;
            Ok((buf, ImageFormat::WebP))
        }
        OutputFormat::Passthrough => Err(SnapError::Encode(
            "passthrough profiles do not re-encode".to_string(),
        )),
    }
}

/// Picks the oxipng deflater from the profile quality
fn png_options(quality: f32) -> Options {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= HIGH_PNG_QUALITY_THRESHOLD {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    options
}

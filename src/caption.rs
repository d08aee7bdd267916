//! Optional image captioning hook.

use crate::constants::CAPTION_PLACEHOLDER;
use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

/// External service producing a one-sentence description of an image
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn describe(&self, image: &[u8], mime_type: &str) -> Result<String>;
}

/// Calls `captioner`, substituting a placeholder on failure or empty output.
pub async fn caption_or_placeholder(
    captioner: &dyn Captioner,
    image: &[u8],
    mime_type: &str,
) -> String {
    match captioner.describe(image, mime_type).await {
        Ok(caption) if !caption.trim().is_empty() => caption.trim().to_string(),
        Ok(_) => CAPTION_PLACEHOLDER.to_string(),
        Err(e) => {
            warn!(error = %e, "captioning failed");
            CAPTION_PLACEHOLDER.to_string()
        }
    }
}

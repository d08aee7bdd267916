//! Object key generation for uploaded blobs.

use crate::constants::FALLBACK_STEM;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static KEY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Reduces a user-supplied file name to a safe key stem.
///
/// Drops any directory part and the final extension, turns whitespace into
/// `_` and removes everything outside `[A-Za-z0-9._-]`.
pub fn sanitize_stem(original_name: &str) -> String {
    let file_name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };

    let cleaned: String = stem
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Lower-cased extension of the original file name, if any
pub fn original_extension(original_name: &str) -> Option<String> {
    let file_name = original_name.rsplit(['/', '\\']).next()?;
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => {
            let ext = &file_name[idx + 1..];
            ext.chars()
                .all(|c| c.is_ascii_alphanumeric())
                .then(|| ext.to_ascii_lowercase())
        }
        _ => None,
    }
}

/// Builds a collision-resistant key:
/// `{unix micros}-{sequence}{random}-{stem}.{extension}`.
///
/// The sequence number is unique per process and the random part comes from
/// a UUID v4, so keys never depend on timestamp granularity alone.
pub fn object_key(original_name: &str, extension: &str) -> String {
    let micros = Utc::now().timestamp_micros();
    let sequence = KEY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();

    format!(
        "{}-{}{}-{}.{}",
        micros,
        sequence,
        &random[..8],
        sanitize_stem(original_name),
        extension.trim_start_matches('.').to_ascii_lowercase()
    )
}

//! Storage key derivation.
//!
//! All key builders here are pure and deterministic given identical inputs,
//! which keeps re-processing idempotent and makes them trivially testable.
//! `unique_filename` is the one intentionally non-deterministic helper: it
//! stamps an upload with a timestamp and a short uuid.

use chrono::Utc;
use uuid::Uuid;

use fotogate_core::models::{AssetType, SizeClass, ThumbnailFormat};

const MAX_BASENAME_LEN: usize = 50;

/// Build the storage key for a thumbnail variant.
///
/// `events/{scope_id}/thumbnails/{base}-{size}.{ext}` when the asset type is
/// `events` and a scope id is present, otherwise
/// `{asset_type}/thumbnails/{base}-{size}.{ext}`. The extension is `webp`
/// for webp variants and `jpg` otherwise.
pub fn thumbnail_key(
    asset_type: AssetType,
    scope_id: Option<&str>,
    filename: &str,
    size: SizeClass,
    format: ThumbnailFormat,
) -> String {
    let base = strip_extension(filename);
    let ext = format.extension();

    match (asset_type, scope_id) {
        (AssetType::Events, Some(event_id)) => {
            format!("events/{}/thumbnails/{}-{}.{}", event_id, base, size, ext)
        }
        _ => format!("{}/thumbnails/{}-{}.{}", asset_type, base, size, ext),
    }
}

/// Build the storage key for an uploaded original.
pub fn original_key(asset_type: AssetType, scope_id: Option<&str>, filename: &str) -> String {
    match (asset_type, scope_id) {
        (AssetType::Events, Some(event_id)) => {
            format!("events/{}/originals/{}", event_id, filename)
        }
        _ => format!("{}/originals/{}", asset_type, filename),
    }
}

/// Generate a collision-resistant filename from a client-supplied one:
/// `{sanitized base}-{unix millis}-{uuid8}{ext}`. The base is restricted to
/// `[a-zA-Z0-9-_]` and truncated so hostile filenames cannot influence key
/// structure.
pub fn unique_filename(original_name: &str) -> String {
    let (base, ext) = split_extension(original_name);

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_BASENAME_LEN)
        .collect();
    let sanitized = if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    };

    let timestamp = Utc::now().timestamp_millis();
    let unique_id = Uuid::new_v4().simple().to_string();

    format!(
        "{}-{}-{}{}",
        sanitized,
        timestamp,
        &unique_id[..8],
        ext.to_lowercase()
    )
}

/// Filename without its extension (no-op when there is none).
fn strip_extension(filename: &str) -> &str {
    split_extension(filename).0
}

/// Split into (base, extension-with-dot). Hidden files like `.env` are
/// treated as extensionless.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], &filename[idx..]),
        _ => (filename, ""),
    }
}

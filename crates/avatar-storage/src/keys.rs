//! File name generation shared by storage backends.
//!
//! Name format: `{field}-{unix_millis}-{random}{ext}`. The random part is a full `u64`
//! draw, so two names generated within the same millisecond collide with probability
//! around 2^-64 per pair.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use avatar_core::constants::{DEFAULT_AVATAR_EXTENSION, DEFAULT_FIELD_NAME};

const MAX_EXTENSION_LEN: usize = 16;

/// Generate a collision-resistant file name for an upload.
pub fn generate_file_name(field_name: &str, original_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format_file_name(field_name, original_name, millis, rand::random::<u64>())
}

/// Deterministic core of [`generate_file_name`].
pub fn format_file_name(field_name: &str, original_name: &str, millis: u128, random: u64) -> String {
    format!(
        "{}-{}-{}{}",
        sanitize_field_name(field_name),
        millis,
        random,
        file_extension(original_name)
    )
}

/// Extension of `original_name` including the leading dot, case preserved.
///
/// Falls back to `.png` when the name has no extension or the extension contains
/// anything other than ASCII letters and digits.
pub fn file_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_AVATAR_EXTENSION.to_string())
}

// Field labels come from the client; keep generated names flat and path-safe.
fn sanitize_field_name(field_name: &str) -> String {
    let sanitized: String = field_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        DEFAULT_FIELD_NAME.to_string()
    } else {
        sanitized
    }
}

//! Accepted image formats for catalog images and place banners.

use crate::validation::{FieldError, ERR_INVALID_TYPE, ERR_REQUIRED};

/// Mimetypes an uploaded image may declare.
pub const IMAGE_MIMETYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Resolve the `Content-Type` of an upload to one of [`IMAGE_MIMETYPES`].
///
/// Parameters such as `; charset=...` are ignored and matching is
/// case-insensitive.
pub fn image_mimetype(content_type: Option<&str>) -> Result<&'static str, FieldError> {
    let raw = content_type
        .map(|v| v.split(';').next().unwrap_or_default().trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FieldError::new("Content-Type", ERR_REQUIRED))?;

    IMAGE_MIMETYPES
        .iter()
        .find(|m| m.eq_ignore_ascii_case(raw))
        .copied()
        .ok_or_else(|| {
            FieldError::new("Content-Type", ERR_INVALID_TYPE)
                .with_details(format!("expected one of {}", IMAGE_MIMETYPES.join(", ")))
        })
}

//! Photo upload rules.

use std::path::Path;

use devcamp_core::{BootcampId, DomainError, DomainResult};

/// Photo every bootcamp starts with.
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Reject anything that is not an image or is larger than `max_bytes`.
pub fn validate_photo(content_type: Option<&str>, size: u64, max_bytes: u64) -> DomainResult<()> {
    if !content_type.is_some_and(|ct| ct.starts_with("image")) {
        return Err(DomainError::validation("Please upload a valid image file"));
    }
    if size > max_bytes {
        return Err(DomainError::validation(format!(
            "Please upload an image less than {max_bytes}"
        )));
    }
    Ok(())
}

/// Stored name for a bootcamp photo: `photo_<id><.ext>`.
///
/// Only the original extension survives, and only when it is plain ASCII
/// alphanumerics, so client file names never reach the file system.
pub fn photo_file_name(id: BootcampId, original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("photo_{id}{ext}")
}

//! # Image Store Trait

use super::errors::{UploadError, UploadResult};

/// Extensions accepted for item images
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Accepts image bytes and hands back a stable public URL
pub trait ImageStore: Send + Sync + std::fmt::Debug {
    /// Store `data` under a fresh name; `original_name` only supplies the extension
    fn store(&self, original_name: &str, data: &[u8]) -> UploadResult<String>;
}

/// Lowercased extension of `name` if it is an allowed image type
pub fn image_extension(name: &str) -> UploadResult<String> {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(UploadError::InvalidExtension(ext))
    }
}

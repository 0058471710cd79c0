//! # Local Filesystem Image Store

use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use super::errors::{UploadError, UploadResult};
use super::store::{image_extension, ImageStore};

/// Writes images under `root` and serves them from `public_prefix`
#[derive(Debug)]
pub struct LocalImageStore {
    root: PathBuf,
    public_prefix: String,
    max_bytes: u64,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ImageStore for LocalImageStore {
    fn store(&self, original_name: &str, data: &[u8]) -> UploadResult<String> {
        let ext = image_extension(original_name)?;
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        let size = data.len() as u64;
        if size > self.max_bytes {
            return Err(UploadError::TooLarge(size, self.max_bytes));
        }

        fs::create_dir_all(&self.root).map_err(|e| UploadError::Io(e.to_string()))?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.root.join(&filename), data).map_err(|e| UploadError::Io(e.to_string()))?;

        Ok(format!("{}/{}", self.public_prefix, filename))
    }
}

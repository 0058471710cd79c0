//! # Upload Errors

use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Unsupported image type '{0}'. Allowed: jpg, jpeg, png")]
    InvalidExtension(String),

    #[error("Uploaded file is empty")]
    Empty,

    #[error("File too large: {0} bytes (max: {1})")]
    TooLarge(u64, u64),

    #[error("I/O error: {0}")]
    Io(String),
}

impl UploadError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::InvalidExtension(_) => 400,
            UploadError::Empty => 400,
            UploadError::TooLarge(_, _) => 413,
            UploadError::Io(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            UploadError::InvalidExtension(_) | UploadError::Empty => "VALIDATION_ERROR",
            UploadError::TooLarge(_, _) => "PAYLOAD_TOO_LARGE",
            UploadError::Io(_) => "STORAGE_ERROR",
        }
    }
}

//! # Uploads
//!
//! Image storage for item pictures. Files get a fresh UUID name; the caller
//! only learns the public URL.

mod errors;
mod local;
mod store;

pub use errors::{UploadError, UploadResult};
pub use local::LocalImageStore;
pub use store::{image_extension, ImageStore, ALLOWED_EXTENSIONS};

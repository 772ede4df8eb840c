use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::StoragePath;

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Writes the object and returns its public URL.
    async fn put(
        &self,
        path: &StoragePath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, MediaStoreError>;

    fn public_url(&self, path: &StoragePath) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

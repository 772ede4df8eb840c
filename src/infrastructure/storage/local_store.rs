use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StoragePath;

/// Files under `base_path`, served back by the router under the public base URL.
/// The local filesystem keeps no content type; it is inferred from the extension.
pub struct LocalMediaStore {
    inner: Arc<LocalFileSystem>,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(base_path: PathBuf, public_base_url: &str) -> Result<Self, MediaStoreError> {
        std::fs::create_dir_all(&base_path)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| MediaStoreError::InvalidConfiguration(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(
        &self,
        path: &StoragePath,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        self.inner
            .put(&store_path, PutPayload::from(bytes))
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

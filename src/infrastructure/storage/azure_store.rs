use std::sync::Arc;

use bytes::Bytes;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path as StorePath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StoragePath;

pub struct AzureMediaStore {
    inner: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl AzureMediaStore {
    pub fn new(
        account: &str,
        access_key: &str,
        container: &str,
        public_base_url: &str,
    ) -> Result<Self, MediaStoreError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| MediaStoreError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(store),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl MediaStore for AzureMediaStore {
    async fn put(
        &self,
        path: &StoragePath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        self.inner
            .put_opts(
                &store_path,
                PutPayload::from(bytes),
                PutOptions {
                    attributes,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| MediaStoreError::UploadFailed(e.to_string()))?;

        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

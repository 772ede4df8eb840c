use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StoragePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

pub struct InMemoryMediaStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    public_base_url: String,
}

impl InMemoryMediaStore {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get(&self, path: &StoragePath) -> Option<StoredObject> {
        self.objects.read().await.get(path.as_str()).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn put(
        &self,
        path: &StoragePath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, MediaStoreError> {
        self.objects.write().await.insert(
            path.as_str().to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::presentation::config::{StorageProvider, StorageSettings};

use super::azure_store::AzureMediaStore;
use super::local_store::LocalMediaStore;

pub struct MediaStoreFactory;

impl MediaStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn MediaStore>, MediaStoreError> {
        match settings.provider {
            StorageProvider::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = LocalMediaStore::new(path, &settings.public_base_url)?;
                Ok(Arc::new(store))
            }
            StorageProvider::Azure => {
                let account = settings.azure_account.as_deref().ok_or_else(|| {
                    MediaStoreError::InvalidConfiguration("azure_account required".into())
                })?;
                let key = settings.azure_access_key.as_deref().ok_or_else(|| {
                    MediaStoreError::InvalidConfiguration("azure_access_key required".into())
                })?;
                let container = settings.azure_container.as_deref().ok_or_else(|| {
                    MediaStoreError::InvalidConfiguration("azure_container required".into())
                })?;
                let store =
                    AzureMediaStore::new(account, key, container, &settings.public_base_url)?;
                Ok(Arc::new(store))
            }
        }
    }
}

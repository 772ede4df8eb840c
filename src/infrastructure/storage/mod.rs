mod azure_store;
mod local_store;
mod memory_store;
mod store_factory;

pub use azure_store::AzureMediaStore;
pub use local_store::LocalMediaStore;
pub use memory_store::{InMemoryMediaStore, StoredObject};
pub use store_factory::MediaStoreFactory;

#[cfg(feature = "storage-local")]
use crate::LocalBlobStore;
use crate::{BlobStore, MemoryBlobStore, StorageBackend, StorageResult};
#[cfg(not(feature = "storage-local"))]
use crate::StorageError;
use blobgate_core::Config;
use std::sync::Arc;

/// Create a blob store based on configuration
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let store = LocalBlobStore::new(config.local_storage_path()).await?;
            tracing::info!(path = %config.local_storage_path(), "Using local blob storage");
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            tracing::warn!("Using in-memory blob storage; content is lost on restart");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
    }
}

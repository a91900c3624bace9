use crate::traits::{Blob, BlobContent, BlobReader, BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use blobgate_core::{BlobId, Identity};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;
use tokio::sync::RwLock;

#[derive(Clone)]
struct StoredBlob {
    content_type: String,
    data: Bytes,
}

/// In-memory blob store, scoped per user.
///
/// Content is reference counted, so opening a stream never copies the blob.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<(String, BlobId), StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a blob owned by `user`.
    pub async fn insert(
        &self,
        user: &str,
        blob_id: BlobId,
        content_type: &str,
        data: impl Into<Bytes>,
    ) {
        let data = data.into();
        tracing::debug!(
            user = %user,
            blob_id = %blob_id,
            size_bytes = data.len(),
            "Memory storage insert"
        );
        self.blobs.write().await.insert(
            (user.to_string(), blob_id),
            StoredBlob {
                content_type: content_type.to_string(),
                data,
            },
        );
    }
}

struct MemoryContent(Bytes);

#[async_trait]
impl BlobContent for MemoryContent {
    async fn open(self: Box<Self>) -> StorageResult<BlobReader> {
        let MemoryContent(data) = *self;
        Ok(Box::pin(Cursor::new(data)))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn retrieve(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<Blob> {
        let stored = self
            .blobs
            .read()
            .await
            .get(&(identity.user().to_string(), blob_id.clone()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(blob_id.to_string()))?;

        Ok(Blob::new(
            blob_id.clone(),
            stored.data.len() as u64,
            stored.content_type,
            MemoryContent(stored.data),
        ))
    }

    async fn exists(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<bool> {
        Ok(self
            .blobs
            .read()
            .await
            .contains_key(&(identity.user().to_string(), blob_id.clone())))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

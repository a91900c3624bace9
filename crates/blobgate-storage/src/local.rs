use crate::keys;
use crate::traits::{Blob, BlobContent, BlobReader, BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use blobgate_core::{BlobId, Identity};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Sidecar metadata stored next to each blob.
#[derive(Debug, Serialize, Deserialize)]
struct BlobMetadata {
    content_type: String,
}

/// Local filesystem blob store
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/blobgate/blobs")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore { base_path })
    }

    /// Convert a storage key to a filesystem path.
    ///
    /// Keys are validated in `keys`, so a key never contains `..` or a leading `/`.
    fn key_to_path(&self, storage_key: &str) -> PathBuf {
        self.base_path.join(storage_key)
    }

    /// Resolve content and metadata paths. An id that cannot form a valid key
    /// cannot name a stored blob, so it is reported as not found.
    fn blob_paths(&self, user: &str, blob_id: &BlobId) -> StorageResult<(PathBuf, PathBuf)> {
        let keys = keys::blob_key(user, blob_id)
            .and_then(|content| Ok((content, keys::metadata_key(user, blob_id)?)));
        match keys {
            Ok((content, metadata)) => Ok((self.key_to_path(&content), self.key_to_path(&metadata))),
            Err(StorageError::InvalidKey(reason)) => {
                tracing::debug!(blob_id = %blob_id, reason = %reason, "Rejected blob id");
                Err(StorageError::NotFound(blob_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Store a blob owned by `user` together with its metadata sidecar.
    pub async fn store(
        &self,
        user: &str,
        blob_id: &BlobId,
        content_type: &str,
        data: &[u8],
    ) -> StorageResult<()> {
        let key = keys::blob_key(user, blob_id)?;
        let path = self.key_to_path(&key);
        let metadata_path = self.key_to_path(&keys::metadata_key(user, blob_id)?);

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        let metadata = serde_json::to_vec(&BlobMetadata {
            content_type: content_type.to_string(),
        })
        .map_err(|e| StorageError::BackendError(format!("Failed to encode metadata: {}", e)))?;
        fs::write(&metadata_path, metadata).await?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

struct LocalContent {
    path: PathBuf,
}

#[async_trait]
impl BlobContent for LocalContent {
    async fn open(self: Box<Self>) -> StorageResult<BlobReader> {
        let file = fs::File::open(&self.path).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to open file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Box::pin(file))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn retrieve(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<Blob> {
        let (path, metadata_path) = self.blob_paths(identity.user(), blob_id)?;

        let size = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return Err(StorageError::NotFound(blob_id.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(blob_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let metadata: BlobMetadata = match fs::read(&metadata_path).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                StorageError::BackendError(format!(
                    "Corrupt metadata {}: {}",
                    metadata_path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BlobMetadata {
                content_type: "application/octet-stream".to_string(),
            },
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            path = %path.display(),
            size_bytes = size,
            content_type = %metadata.content_type,
            "Local storage blob resolved"
        );

        Ok(Blob::new(
            blob_id.clone(),
            size,
            metadata.content_type,
            LocalContent { path },
        ))
    }

    async fn exists(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<bool> {
        let (path, _) = match self.blob_paths(identity.user(), blob_id) {
            Ok(paths) => paths,
            Err(StorageError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

//! Storage abstraction trait
//!
//! This module defines the [`BlobStore`] trait that all storage backends must
//! implement, and the [`Blob`] handle they return.

use crate::StorageBackend;
use async_trait::async_trait;
use blobgate_core::{BlobId, Identity};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream over a blob's content.
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// Deferred access to a blob's content.
///
/// Opening consumes the accessor, so a blob's content can be opened at most once.
#[async_trait]
pub trait BlobContent: Send {
    async fn open(self: Box<Self>) -> StorageResult<BlobReader>;
}

/// A resolved blob: metadata plus a single-use content accessor.
///
/// Resolving a blob does not open its content; nothing is held open until
/// [`Blob::open_stream`] is called.
pub struct Blob {
    id: BlobId,
    size: u64,
    content_type: String,
    content: Box<dyn BlobContent>,
}

impl Blob {
    pub fn new(
        id: BlobId,
        size: u64,
        content_type: impl Into<String>,
        content: impl BlobContent + 'static,
    ) -> Self {
        Self {
            id,
            size,
            content_type: content_type.into(),
            content: Box::new(content),
        }
    }

    pub fn id(&self) -> &BlobId {
        &self.id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Open the content stream. Consumes the blob.
    pub async fn open_stream(self) -> StorageResult<BlobReader> {
        self.content.open().await
    }
}

impl Debug for Blob {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Blob")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Blob storage abstraction
///
/// Backends resolve a blob id on behalf of an identity. A blob the identity
/// cannot see must be reported as [`StorageError::NotFound`], never as a
/// distinct error, so callers cannot probe for other users' blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Resolve a blob's metadata and content accessor.
    async fn retrieve(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<Blob>;

    /// Check whether a blob exists for the identity.
    ///
    /// The default resolves the blob and drops the unopened handle. Backends
    /// with a cheaper existence check should override it.
    async fn exists(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<bool> {
        match self.retrieve(blob_id, identity).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

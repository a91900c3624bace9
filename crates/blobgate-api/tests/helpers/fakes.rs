//! Collaborators that count their calls.

use async_trait::async_trait;
use axum::http::request::Parts;
use blobgate_api::auth::{AuthError, Authenticator, AuthenticatorChain};
use blobgate_api::token::{AttachmentAccessToken, HmacTokenFactory, TokenError, TokenFactory};
use blobgate_core::{BlobId, Identity};
use blobgate_storage::{
    Blob, BlobStore, MemoryBlobStore, StorageBackend, StorageError, StorageResult,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryBlobStore,
    pub retrieves: AtomicUsize,
    pub exists_checks: AtomicUsize,
    pub failing: AtomicBool,
}

impl CountingStore {
    /// Total number of storage calls of any kind.
    pub fn calls(&self) -> usize {
        self.retrieves.load(Ordering::SeqCst) + self.exists_checks.load(Ordering::SeqCst)
    }

    pub fn fail_with_backend_error(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_failing(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(
                "disk on fire at /var/lib/blobs".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for CountingStore {
    async fn retrieve(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<Blob> {
        self.retrieves.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        self.inner.retrieve(blob_id, identity).await
    }

    async fn exists(&self, blob_id: &BlobId, identity: &Identity) -> StorageResult<bool> {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        self.inner.exists(blob_id, identity).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

pub struct CountingTokenFactory {
    inner: HmacTokenFactory,
    pub generated: AtomicUsize,
}

impl CountingTokenFactory {
    pub fn new(inner: HmacTokenFactory) -> Self {
        Self {
            inner,
            generated: AtomicUsize::new(0),
        }
    }

    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }
}

impl TokenFactory for CountingTokenFactory {
    fn generate_attachment_token(
        &self,
        user: &str,
        blob_id: &BlobId,
    ) -> Result<AttachmentAccessToken, TokenError> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        self.inner.generate_attachment_token(user, blob_id)
    }

    fn verify_attachment_token(
        &self,
        serialized: &str,
        blob_id: &BlobId,
    ) -> Result<AttachmentAccessToken, TokenError> {
        self.inner.verify_attachment_token(serialized, blob_id)
    }
}

pub struct CountingAuthenticator {
    inner: AuthenticatorChain,
    pub attempts: AtomicUsize,
}

impl CountingAuthenticator {
    pub fn new(inner: AuthenticatorChain) -> Self {
        Self {
            inner,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn authenticate(&self, parts: &Parts) -> Result<Identity, AuthError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.authenticate(parts).await
    }
}

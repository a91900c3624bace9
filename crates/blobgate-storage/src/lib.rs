//! Blobgate Storage Library
//!
//! This crate provides the blob storage abstraction consumed by the download
//! gateway, together with an in-memory and a local filesystem backend.
//!
//! # Storage layout
//!
//! Blobs are scoped per user. The filesystem backend keeps each blob under
//! `{user}/{blob_id}` with a `{user}/{blob_id}.meta.json` sidecar holding its
//! content type. Key generation is centralized in the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use blobgate_core::StorageBackend;
pub use factory::create_blob_store;
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{Blob, BlobContent, BlobReader, BlobStore, StorageError, StorageResult};

//! Shared key generation for storage backends.
//!
//! Key format: `{user}/{blob_id}` for content and `{user}/{blob_id}.meta.json`
//! for the metadata sidecar. Both segments must be single path components.

use crate::traits::{StorageError, StorageResult};
use blobgate_core::BlobId;

const METADATA_SUFFIX: &str = ".meta.json";

/// Generate the content key of a blob owned by `user`.
pub fn blob_key(user: &str, blob_id: &BlobId) -> StorageResult<String> {
    validate_segment(user)?;
    validate_segment(blob_id.as_str())?;
    if blob_id.as_str().ends_with(METADATA_SUFFIX) {
        return Err(StorageError::InvalidKey(
            "Blob id collides with metadata suffix".to_string(),
        ));
    }
    Ok(format!("{}/{}", user, blob_id))
}

/// Generate the metadata sidecar key of a blob owned by `user`.
pub fn metadata_key(user: &str, blob_id: &BlobId) -> StorageResult<String> {
    Ok(format!("{}{}", blob_key(user, blob_id)?, METADATA_SUFFIX))
}

fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty()
        || segment == "."
        || segment.contains("..")
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key segment '{}' contains invalid characters",
            segment
        )));
    }
    Ok(())
}

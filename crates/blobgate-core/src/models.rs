//! Request-scoped domain values.

use crate::error::AppError;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identifier of a stored blob (message part or attachment).
///
/// Always non-empty. The gateway treats the value as opaque; only storage
/// backends give it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::bad_request("Blob id must not be empty"));
        }
        Ok(BlobId(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How an [`Identity`] was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `Authorization: Bearer <api key>`
    ApiKey,
    /// Attachment access token presented as a query parameter.
    AttachmentToken,
}

impl Display for AuthMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuthMethod::ApiKey => write!(f, "api_key"),
            AuthMethod::AttachmentToken => write!(f, "attachment_token"),
        }
    }
}

/// Authenticated principal. Produced by an authenticator and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user: String,
    method: AuthMethod,
}

impl Identity {
    pub fn new(user: impl Into<String>, method: AuthMethod) -> Self {
        Self {
            user: user.into(),
            method,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorMetadata, FailureCategory};

    #[test]
    fn test_blob_id_rejects_empty() {
        let err = BlobId::new("").unwrap_err();
        assert_eq!(err.category(), FailureCategory::MalformedRequest);
    }

    #[test]
    fn test_blob_id_keeps_value() {
        let id = BlobId::new("abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn test_identity_accessors() {
        let identity = Identity::new("alice@example.com", AuthMethod::ApiKey);
        assert_eq!(identity.user(), "alice@example.com");
        assert_eq!(identity.method(), AuthMethod::ApiKey);
        assert_eq!(identity.method().to_string(), "api_key");
    }
}

//! Attachment access tokens.
//!
//! A token grants one user read access to one blob until it expires, without
//! any server-side state. Serialized form:
//!
//! `base64url(user) "." base64url(blob_id) "." expiry_unix_secs "." base64url(HMAC-SHA256)`
//!
//! The MAC covers the first three dot-separated fields exactly as serialized.

use base64::Engine;
use blobgate_core::BlobId;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed attachment access token")]
    Malformed,

    #[error("Invalid attachment access token signature")]
    BadSignature,

    #[error("Attachment access token has expired")]
    Expired,

    #[error("Attachment access token was issued for another blob")]
    WrongBlob,

    #[error("Failed to sign attachment access token: {0}")]
    Signing(String),
}

/// Signed grant of (user, blob) access until `expires_at` (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentAccessToken {
    user: String,
    blob_id: BlobId,
    expires_at: u64,
    signature: Vec<u8>,
}

impl AttachmentAccessToken {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn blob_id(&self) -> &BlobId {
        &self.blob_id
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Serialize the token into its self-contained textual form.
    pub fn serialize(&self) -> String {
        format!(
            "{}{}{}",
            signing_input(&self.user, &self.blob_id, self.expires_at),
            SEPARATOR,
            base64_url_encode(&self.signature)
        )
    }
}

/// Issues and validates attachment access tokens.
pub trait TokenFactory: Send + Sync {
    fn generate_attachment_token(
        &self,
        user: &str,
        blob_id: &BlobId,
    ) -> Result<AttachmentAccessToken, TokenError>;

    /// Validate a serialized token for a download of `blob_id`.
    fn verify_attachment_token(
        &self,
        serialized: &str,
        blob_id: &BlobId,
    ) -> Result<AttachmentAccessToken, TokenError>;
}

/// HMAC-SHA256 token factory keyed by the configured secret.
pub struct HmacTokenFactory {
    secret: Vec<u8>,
    ttl: Duration,
}

impl HmacTokenFactory {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify_at(
        &self,
        serialized: &str,
        blob_id: &BlobId,
        now: u64,
    ) -> Result<AttachmentAccessToken, TokenError> {
        let (signed_part, signature) = serialized
            .rsplit_once(SEPARATOR)
            .ok_or(TokenError::Malformed)?;
        let signature = base64_url_decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(signed_part.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let mut fields = signed_part.split(SEPARATOR);
        let (user, token_blob, expires_at) =
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(user), Some(blob), Some(expiry), None) => (user, blob, expiry),
                _ => return Err(TokenError::Malformed),
            };
        let user = decode_text(user)?;
        let token_blob = BlobId::new(decode_text(token_blob)?).map_err(|_| TokenError::Malformed)?;
        let expires_at: u64 = expires_at.parse().map_err(|_| TokenError::Malformed)?;

        if now > expires_at {
            return Err(TokenError::Expired);
        }
        if &token_blob != blob_id {
            return Err(TokenError::WrongBlob);
        }

        Ok(AttachmentAccessToken {
            user,
            blob_id: token_blob,
            expires_at,
            signature,
        })
    }
}

impl TokenFactory for HmacTokenFactory {
    fn generate_attachment_token(
        &self,
        user: &str,
        blob_id: &BlobId,
    ) -> Result<AttachmentAccessToken, TokenError> {
        let expires_at = now_unix_secs().saturating_add(self.ttl.as_secs());

        let mut mac = self.mac()?;
        mac.update(signing_input(user, blob_id, expires_at).as_bytes());
        let signature = mac.finalize().into_bytes().to_vec();

        Ok(AttachmentAccessToken {
            user: user.to_string(),
            blob_id: blob_id.clone(),
            expires_at,
            signature,
        })
    }

    fn verify_attachment_token(
        &self,
        serialized: &str,
        blob_id: &BlobId,
    ) -> Result<AttachmentAccessToken, TokenError> {
        self.verify_at(serialized, blob_id, now_unix_secs())
    }
}

fn signing_input(user: &str, blob_id: &BlobId, expires_at: u64) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        base64_url_encode(user.as_bytes()),
        base64_url_encode(blob_id.as_str().as_bytes()),
        expires_at,
        sep = SEPARATOR
    )
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn decode_text(field: &str) -> Result<String, TokenError> {
    let raw = base64_url_decode(field).map_err(|_| TokenError::Malformed)?;
    String::from_utf8(raw).map_err(|_| TokenError::Malformed)
}

fn base64_url_encode(data: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

fn base64_url_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> HmacTokenFactory {
        HmacTokenFactory::new(
            "0123456789abcdef0123456789abcdef".as_bytes(),
            Duration::from_secs(300),
        )
    }

    fn blob(id: &str) -> BlobId {
        BlobId::new(id).unwrap()
    }

    #[test]
    fn test_generate_then_verify() {
        let factory = factory();
        let token = factory
            .generate_attachment_token("alice@example.com", &blob("abc123"))
            .unwrap();
        let serialized = token.serialize();
        assert!(!serialized.is_empty());

        let verified = factory
            .verify_attachment_token(&serialized, &blob("abc123"))
            .unwrap();
        assert_eq!(verified, token);
        assert_eq!(verified.user(), "alice@example.com");
    }

    #[test]
    fn test_serialized_form_embeds_all_fields() {
        let token = factory()
            .generate_attachment_token("alice", &blob("abc123"))
            .unwrap();
        let serialized = token.serialize();
        let fields: Vec<&str> = serialized.split('.').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], base64_url_encode(b"alice"));
        assert_eq!(fields[1], base64_url_encode(b"abc123"));
        assert_eq!(fields[2], token.expires_at().to_string());
    }

    #[test]
    fn test_rejects_other_blob() {
        let factory = factory();
        let serialized = factory
            .generate_attachment_token("alice", &blob("abc123"))
            .unwrap()
            .serialize();
        assert_eq!(
            factory.verify_attachment_token(&serialized, &blob("other")),
            Err(TokenError::WrongBlob)
        );
    }

    #[test]
    fn test_rejects_tampered_user() {
        let factory = factory();
        let serialized = factory
            .generate_attachment_token("alice", &blob("abc123"))
            .unwrap()
            .serialize();
        let tampered = serialized.replacen(
            &base64_url_encode(b"alice"),
            &base64_url_encode(b"mallory"),
            1,
        );
        assert_eq!(
            factory.verify_attachment_token(&tampered, &blob("abc123")),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_other_secret() {
        let serialized = factory()
            .generate_attachment_token("alice", &blob("abc123"))
            .unwrap()
            .serialize();
        let other = HmacTokenFactory::new(
            "another-secret-another-secret-xx".as_bytes(),
            Duration::from_secs(300),
        );
        assert_eq!(
            other.verify_attachment_token(&serialized, &blob("abc123")),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_rejects_expired() {
        let factory = factory();
        let token = factory
            .generate_attachment_token("alice", &blob("abc123"))
            .unwrap();
        assert_eq!(
            factory.verify_at(&token.serialize(), &blob("abc123"), token.expires_at() + 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let factory = factory();
        for garbage in ["", "no-separators", "a.b", "!!!.???", "a.b.c.d.e"] {
            assert!(factory
                .verify_attachment_token(garbage, &blob("abc123"))
                .is_err());
        }
    }
}

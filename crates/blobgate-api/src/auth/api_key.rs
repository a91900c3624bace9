use super::authenticator::{AuthError, Authenticator};
use async_trait::async_trait;
use axum::http::{header, request::Parts};
use blobgate_core::{AuthMethod, Identity};
use subtle::ConstantTimeEq;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticates `Authorization: Bearer <key>` against configured per-user keys.
pub struct ApiKeyAuthenticator {
    keys: Vec<(String, String)>,
}

impl ApiKeyAuthenticator {
    /// `keys` holds `(user, key)` pairs.
    pub fn new(keys: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, parts: &Parts) -> Result<Identity, AuthError> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Err(AuthError::MissingCredentials);
        };
        let auth_header = auth_header.to_str().map_err(|_| {
            AuthError::InvalidCredentials("Authorization header is not valid ASCII".to_string())
        })?;
        let presented = auth_header.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
            AuthError::InvalidCredentials("Invalid authorization header format".to_string())
        })?;

        // Every key is compared, with no early exit.
        let mut matched = None;
        for (user, key) in &self.keys {
            if secure_compare(presented, key) && matched.is_none() {
                matched = Some(user);
            }
        }

        matched
            .map(|user| Identity::new(user.clone(), AuthMethod::ApiKey))
            .ok_or_else(|| AuthError::InvalidCredentials("Unknown API key".to_string()))
    }
}

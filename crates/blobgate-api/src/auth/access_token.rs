use super::authenticator::{AuthError, Authenticator};
use crate::token::TokenFactory;
use crate::utils::download_path::raw_blob_id;
use async_trait::async_trait;
use axum::{
    extract::Query,
    http::{request::Parts, Method},
};
use blobgate_core::{AuthMethod, BlobId, Identity};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct AccessTokenQuery {
    access_token: Option<String>,
}

/// Authenticates downloads carrying an attachment access token in the
/// [`ACCESS_TOKEN_QUERY_PARAM`](blobgate_core::constants::ACCESS_TOKEN_QUERY_PARAM)
/// query parameter.
///
/// Only `GET` requests are eligible, and the token must have been issued for
/// the blob named in the path.
pub struct AccessTokenAuthenticator {
    token_factory: Arc<dyn TokenFactory>,
}

impl AccessTokenAuthenticator {
    pub fn new(token_factory: Arc<dyn TokenFactory>) -> Self {
        Self { token_factory }
    }
}

#[async_trait]
impl Authenticator for AccessTokenAuthenticator {
    async fn authenticate(&self, parts: &Parts) -> Result<Identity, AuthError> {
        if parts.method != Method::GET {
            return Err(AuthError::MissingCredentials);
        }

        let token = match Query::<AccessTokenQuery>::try_from_uri(&parts.uri) {
            Ok(Query(AccessTokenQuery {
                access_token: Some(token),
            })) => token,
            Ok(_) => return Err(AuthError::MissingCredentials),
            Err(_) => {
                return Err(AuthError::InvalidCredentials(
                    "Unparseable query string".to_string(),
                ))
            }
        };

        let blob_id = raw_blob_id(parts.uri.path())
            .and_then(|raw| BlobId::new(raw).ok())
            .ok_or_else(|| {
                AuthError::InvalidCredentials("Access token used outside a download".to_string())
            })?;

        let token = self
            .token_factory
            .verify_attachment_token(&token, &blob_id)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;

        Ok(Identity::new(token.user(), AuthMethod::AttachmentToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::HmacTokenFactory;
    use axum::http::Request;
    use std::time::Duration;

    fn factory() -> Arc<dyn TokenFactory> {
        Arc::new(HmacTokenFactory::new(
            "0123456789abcdef0123456789abcdef".as_bytes(),
            Duration::from_secs(60),
        ))
    }

    fn parts(method: Method, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn token_for(factory: &Arc<dyn TokenFactory>, blob: &str) -> String {
        factory
            .generate_attachment_token("alice", &BlobId::new(blob).unwrap())
            .unwrap()
            .serialize()
    }

    #[tokio::test]
    async fn test_valid_token_for_path_blob() {
        let factory = factory();
        let token = token_for(&factory, "abc123");
        let identity = AccessTokenAuthenticator::new(factory)
            .authenticate(&parts(
                Method::GET,
                &format!("/download/abc123/file.txt?access_token={token}"),
            ))
            .await
            .unwrap();
        assert_eq!(identity.user(), "alice");
        assert_eq!(identity.method(), AuthMethod::AttachmentToken);
    }

    #[tokio::test]
    async fn test_token_for_other_blob_is_rejected() {
        let factory = factory();
        let token = token_for(&factory, "abc123");
        assert!(matches!(
            AccessTokenAuthenticator::new(factory)
                .authenticate(&parts(
                    Method::GET,
                    &format!("/download/other?access_token={token}")
                ))
                .await,
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_post_and_tokenless_requests_are_missing() {
        let factory = factory();
        let token = token_for(&factory, "abc123");
        let auth = AccessTokenAuthenticator::new(factory);
        assert_eq!(
            auth.authenticate(&parts(
                Method::POST,
                &format!("/download/abc123?access_token={token}")
            ))
            .await,
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            auth.authenticate(&parts(Method::GET, "/download/abc123"))
                .await,
            Err(AuthError::MissingCredentials)
        );
    }
}

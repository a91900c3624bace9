//! Request authentication.
//!
//! Endpoints authenticate through a single [`Authenticator`], usually an
//! [`AuthenticatorChain`] of the bearer API key strategy followed by the
//! attachment access token strategy.

pub mod access_token;
pub mod api_key;
pub mod authenticator;

pub use access_token::AccessTokenAuthenticator;
pub use api_key::ApiKeyAuthenticator;
pub use authenticator::{AuthError, Authenticator, AuthenticatorChain};

use crate::error::HttpAppError;
use axum::http::request::Parts;
use blobgate_core::Identity;

/// Resolve the identity for a request or reject it as unauthorized.
pub async fn authenticate_request(
    authenticator: &dyn Authenticator,
    parts: &Parts,
) -> Result<Identity, HttpAppError> {
    let identity = authenticator.authenticate(parts).await?;
    tracing::debug!(
        user = %identity.user(),
        method = %identity.method(),
        "Request authenticated"
    );
    Ok(identity)
}

use async_trait::async_trait;
use axum::http::request::Parts;
use blobgate_core::Identity;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The request carries no credential this strategy understands.
    #[error("Missing credentials")]
    MissingCredentials,

    /// A credential was presented and rejected.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// One way of turning request metadata into an [`Identity`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, parts: &Parts) -> Result<Identity, AuthError>;
}

/// Tries strategies in order.
///
/// A strategy reporting [`AuthError::MissingCredentials`] hands over to the
/// next one; a rejected credential ends the chain.
#[derive(Default, Clone)]
pub struct AuthenticatorChain {
    strategies: Vec<Arc<dyn Authenticator>>,
}

impl AuthenticatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: Arc<dyn Authenticator>) -> Self {
        self.strategies.push(strategy);
        self
    }
}

#[async_trait]
impl Authenticator for AuthenticatorChain {
    async fn authenticate(&self, parts: &Parts) -> Result<Identity, AuthError> {
        for strategy in &self.strategies {
            match strategy.authenticate(parts).await {
                Err(AuthError::MissingCredentials) => continue,
                outcome => return outcome,
            }
        }
        Err(AuthError::MissingCredentials)
    }
}

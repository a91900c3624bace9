use crate::auth::{AccessTokenAuthenticator, ApiKeyAuthenticator, AuthenticatorChain};
use crate::middleware::CorsPolicy;
use crate::state::AppState;
use crate::token::{HmacTokenFactory, TokenFactory};
use anyhow::{Context, Result};
use blobgate_core::Config;
use blobgate_storage::create_blob_store;
use std::sync::Arc;
use std::time::Duration;

/// Build the storage backend, authenticators and token factory.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let blob_store = create_blob_store(config)
        .await
        .context("Failed to initialize blob storage")?;

    let token_factory: Arc<dyn TokenFactory> = Arc::new(HmacTokenFactory::new(
        config.token_secret().as_bytes(),
        Duration::from_secs(config.token_ttl_seconds()),
    ));

    if config.api_keys().is_empty() {
        tracing::warn!("API_KEYS is empty; only attachment access tokens can authenticate");
    }

    let authenticator = AuthenticatorChain::new()
        .with(Arc::new(ApiKeyAuthenticator::new(
            config.api_keys().iter().cloned(),
        )))
        .with(Arc::new(AccessTokenAuthenticator::new(token_factory.clone())));

    Ok(Arc::new(AppState {
        blob_store,
        authenticator: Arc::new(authenticator),
        token_factory,
        cors: Arc::new(CorsPolicy::new(config.cors_origins())),
    }))
}

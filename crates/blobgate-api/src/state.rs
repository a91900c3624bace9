//! Shared application state.

use crate::auth::Authenticator;
use crate::middleware::CorsPolicy;
use crate::token::TokenFactory;
use blobgate_storage::BlobStore;
use std::sync::Arc;

/// Collaborators every download endpoint needs. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub blob_store: Arc<dyn BlobStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub token_factory: Arc<dyn TokenFactory>,
    pub cors: Arc<CorsPolicy>,
}

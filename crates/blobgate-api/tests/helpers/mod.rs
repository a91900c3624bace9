//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p blobgate-api --test download_test`.

pub mod fakes;

use axum_test::TestServer;
use blobgate_api::auth::{AccessTokenAuthenticator, ApiKeyAuthenticator, AuthenticatorChain};
use blobgate_api::middleware::CorsPolicy;
use blobgate_api::setup::routes;
use blobgate_api::state::AppState;
use blobgate_api::token::{HmacTokenFactory, TokenFactory};
use blobgate_core::BlobId;
use fakes::{CountingAuthenticator, CountingStore, CountingTokenFactory};
use std::sync::Arc;
use std::time::Duration;

pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const ALICE_KEY: &str = "alice-test-key-0123456789";
pub const BOB_KEY: &str = "bob-test-key-0123456789ab";
pub const TEST_TOKEN_SECRET: &str = "test-token-secret-0123456789abcdef";

/// Test application: server plus handles on the counting collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<CountingStore>,
    pub tokens: Arc<CountingTokenFactory>,
    pub auth: Arc<CountingAuthenticator>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Store a blob for `user`.
    pub async fn put_blob(&self, user: &str, blob_id: &str, content_type: &str, data: Vec<u8>) {
        self.store
            .inner
            .insert(user, BlobId::new(blob_id).unwrap(), content_type, data)
            .await;
    }
}

pub fn bearer(key: &str) -> String {
    format!("Bearer {}", key)
}

/// Setup test app over an in-memory store.
pub async fn setup_test_app() -> TestApp {
    let store = Arc::new(CountingStore::default());
    let tokens = Arc::new(CountingTokenFactory::new(HmacTokenFactory::new(
        TEST_TOKEN_SECRET.as_bytes(),
        Duration::from_secs(300),
    )));
    let token_factory: Arc<dyn TokenFactory> = tokens.clone();

    let auth = Arc::new(CountingAuthenticator::new(
        AuthenticatorChain::new()
            .with(Arc::new(ApiKeyAuthenticator::new([
                (ALICE.to_string(), ALICE_KEY.to_string()),
                (BOB.to_string(), BOB_KEY.to_string()),
            ])))
            .with(Arc::new(AccessTokenAuthenticator::new(token_factory.clone()))),
    ));

    let state = Arc::new(AppState {
        blob_store: store.clone(),
        authenticator: auth.clone(),
        token_factory,
        cors: Arc::new(CorsPolicy::new(&["*".to_string()])),
    });

    let app = routes::setup_routes(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        store,
        tokens,
        auth,
    }
}

//! Route configuration and setup
//!
//! The download endpoints are declared once in [`DOWNLOAD_ROUTES`] and folded
//! into the router, so the table is the single source of which method serves
//! which path and whether it is authenticated.

use crate::handlers;
use crate::middleware::{cors_headers_middleware, security_headers_middleware};
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{get, options, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

pub const DOWNLOAD_FROM_ID: &str = "/download/{blobId}";
pub const DOWNLOAD_FROM_ID_AND_NAME: &str = "/download/{blobId}/{name}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    IssueToken,
    Download,
    Preflight,
}

impl Endpoint {
    pub fn method(self) -> Method {
        match self {
            Endpoint::IssueToken => Method::POST,
            Endpoint::Download => Method::GET,
            Endpoint::Preflight => Method::OPTIONS,
        }
    }

    fn handler(self) -> MethodRouter<Arc<AppState>> {
        match self {
            Endpoint::IssueToken => post(handlers::attachment_token::issue_attachment_token),
            Endpoint::Download => get(handlers::download::download),
            Endpoint::Preflight => options(handlers::preflight::preflight),
        }
    }
}

/// How a route participates in CORS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsHandling {
    /// CORS headers are added to whatever the handler returns.
    Decorate,
    /// The handler itself is the preflight answer.
    Preflight,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub endpoint: Endpoint,
    pub path: &'static str,
    pub cors: CorsHandling,
}

pub const DOWNLOAD_ROUTES: &[RouteEntry] = &[
    RouteEntry {
        endpoint: Endpoint::IssueToken,
        path: DOWNLOAD_FROM_ID,
        cors: CorsHandling::Decorate,
    },
    RouteEntry {
        endpoint: Endpoint::IssueToken,
        path: DOWNLOAD_FROM_ID_AND_NAME,
        cors: CorsHandling::Decorate,
    },
    RouteEntry {
        endpoint: Endpoint::Download,
        path: DOWNLOAD_FROM_ID,
        cors: CorsHandling::Decorate,
    },
    RouteEntry {
        endpoint: Endpoint::Download,
        path: DOWNLOAD_FROM_ID_AND_NAME,
        cors: CorsHandling::Decorate,
    },
    RouteEntry {
        endpoint: Endpoint::Preflight,
        path: DOWNLOAD_FROM_ID,
        cors: CorsHandling::Preflight,
    },
    RouteEntry {
        endpoint: Endpoint::Preflight,
        path: DOWNLOAD_FROM_ID_AND_NAME,
        cors: CorsHandling::Preflight,
    },
];

/// Download routes built from [`DOWNLOAD_ROUTES`].
pub fn download_routes(state: Arc<AppState>) -> Router {
    let cors_layer =
        axum::middleware::from_fn_with_state(state.cors.clone(), cors_headers_middleware);

    DOWNLOAD_ROUTES
        .iter()
        .fold(Router::new(), |router, entry| {
            let handler = match entry.cors {
                CorsHandling::Decorate => entry.endpoint.handler().layer(cors_layer.clone()),
                CorsHandling::Preflight => entry.endpoint.handler(),
            };
            router.route(entry.path, handler)
        })
        .with_state(state)
}

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let health = Router::new()
        .route("/health", get(handlers::health::health_check))
        .with_state(state.clone());

    download_routes(state)
        .merge(health)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(security_headers_middleware))
}

//! `OPTIONS /download/{blobId}[/{name}]`: CORS preflight, never authenticated.

use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

pub async fn preflight(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let mut response = StatusCode::OK.into_response();
    state.cors.apply(&headers, response.headers_mut());
    response
}

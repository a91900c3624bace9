//! `POST /download/{blobId}[/{name}]`: issue an attachment access token.
//!
//! The name segment is accepted for symmetry with downloads and ignored.

use crate::auth::authenticate_request;
use crate::context::RequestContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::download_path::resolve_blob_id;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, request::Parts, StatusCode},
    response::Response,
};
use blobgate_core::constants::TEXT_PLAIN_CONTENT_TYPE;
use blobgate_core::AppError;
use std::sync::Arc;

#[tracing::instrument(skip_all, fields(operation = "issue_attachment_token"))]
pub async fn issue_attachment_token(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let (parts, _body) = request.into_parts();
    let mut ctx = RequestContext::new("issue_attachment_token", &parts);
    let result = issue(&state, &parts, &mut ctx).await;
    ctx.finish(result)
}

async fn issue(
    state: &AppState,
    parts: &Parts,
    ctx: &mut RequestContext,
) -> Result<Response, HttpAppError> {
    let identity = authenticate_request(state.authenticator.as_ref(), parts).await?;
    ctx.set_identity(&identity);

    let blob_id = resolve_blob_id(parts.uri.path())?;
    if !state.blob_store.exists(&blob_id, &identity).await? {
        return Err(AppError::NotFound(blob_id.to_string()).into());
    }

    let token = state
        .token_factory
        .generate_attachment_token(identity.user(), &blob_id)?
        .serialize();

    tracing::info!(
        user = %identity.user(),
        blob_id = %blob_id,
        "Attachment access token issued"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, TEXT_PLAIN_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, token.len())
        .body(Body::from(token))
        .map_err(|e| {
            HttpAppError::from(AppError::Internal(format!(
                "Failed to build token response: {}",
                e
            )))
        })
}

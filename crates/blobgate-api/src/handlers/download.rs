//! `GET /download/{blobId}[/{name}]`: stream a blob to an authenticated caller.

use crate::auth::authenticate_request;
use crate::context::RequestContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::streaming::{chunked_body_stream, BlobStreamGuard};
use crate::utils::content_disposition::attachment_disposition;
use crate::utils::download_path::DownloadPath;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, request::Parts, StatusCode},
    response::Response,
};
use blobgate_core::constants::DOWNLOAD_CHUNK_SIZE;
use blobgate_core::AppError;
use std::sync::Arc;

#[tracing::instrument(skip_all, fields(operation = "download_blob"))]
pub async fn download(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();
    let mut ctx = RequestContext::new("download", &parts);
    let result = serve_blob(&state, &parts, &mut ctx).await;
    ctx.finish(result)
}

/// authenticate -> resolve path -> resolve blob -> open -> stream
async fn serve_blob(
    state: &AppState,
    parts: &Parts,
    ctx: &mut RequestContext,
) -> Result<Response, HttpAppError> {
    let identity = authenticate_request(state.authenticator.as_ref(), parts).await?;
    ctx.set_identity(&identity);

    let path = DownloadPath::resolve(parts.uri.path())?;
    let blob = state.blob_store.retrieve(&path.blob_id, &identity).await?;

    let size = blob.size();
    let blob_id = blob.id().clone();
    let content_type = blob.content_type().to_string();
    let reader = blob.open_stream().await?;
    let body = chunked_body_stream(
        BlobStreamGuard::new(reader, blob_id, size),
        DOWNLOAD_CHUNK_SIZE,
    );

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size);
    if let Some(name) = &path.name {
        response = response.header(header::CONTENT_DISPOSITION, attachment_disposition(name));
    }

    response.body(Body::from_stream(body)).map_err(|e| {
        HttpAppError::from(AppError::Internal(format!(
            "Failed to build download response: {}",
            e
        )))
    })
}

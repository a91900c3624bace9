//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpAppError>` and hand it to
//! [`RequestContext::finish`], which logs the failure and renders it here. The
//! status comes from [`ErrorMetadata`], 401 and 404 carry no body, 400 carries
//! its message as text and 500 never leaks details.

use crate::auth::AuthError;
use crate::context::RequestContext;
use crate::token::TokenError;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use blobgate_core::{AppError, ErrorMetadata};
use blobgate_storage::StorageError;

/// Pipeline error. Wraps [`AppError`] so the api crate can convert foreign
/// error types (storage, auth, token) into it; orphan rules forbid doing that
/// on `AppError` itself.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(blob_id) => HttpAppError(AppError::NotFound(blob_id)),
            other => HttpAppError(AppError::storage("Blob storage request failed", other)),
        }
    }
}

impl From<AuthError> for HttpAppError {
    fn from(err: AuthError) -> Self {
        HttpAppError(AppError::Unauthorized(err.to_string()))
    }
}

impl From<TokenError> for HttpAppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(reason) => HttpAppError(AppError::Internal(reason)),
            other => HttpAppError(AppError::Unauthorized(other.to_string())),
        }
    }
}

/// Render the status and body for an error without logging it.
pub(crate) fn render_error(error: &AppError) -> Response {
    let status =
        StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match error.client_message() {
        Some(message) => Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(message))
            .unwrap_or_else(|_| status.into_response()),
        None => status.into_response(),
    }
}

/// Converts HttpAppError to Response, logging it with the request's context.
pub fn error_response_with_context(error: HttpAppError, context: &RequestContext) -> Response {
    context.log_failure(&error.0);
    render_error(&error.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err = HttpAppError::from(StorageError::NotFound("abc".to_string()));
        assert_eq!(err.0.http_status_code(), 404);
    }

    #[test]
    fn test_storage_failures_map_to_500() {
        let err = HttpAppError::from(StorageError::DownloadFailed("disk".to_string()));
        assert_eq!(err.0.http_status_code(), 500);
        let err = HttpAppError::from(StorageError::BackendError("corrupt".to_string()));
        assert_eq!(err.0.http_status_code(), 500);
    }

    #[test]
    fn test_storage_failure_keeps_backend_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "blob file locked");
        let err = HttpAppError::from(StorageError::from(io_err));
        assert_eq!(err.0.error_code(), "STORAGE_ERROR");

        let details = err.0.detailed_message();
        assert!(details.contains("Caused by: IO error: blob file locked"));
        assert!(details.contains("Caused by: blob file locked"));
        assert_eq!(err.0.client_message().as_deref(), Some("Internal server error"));
    }

    #[test]
    fn test_token_rejections_are_unauthorized() {
        for err in [
            TokenError::Malformed,
            TokenError::BadSignature,
            TokenError::Expired,
            TokenError::WrongBlob,
        ] {
            assert_eq!(HttpAppError::from(err).0.http_status_code(), 401);
        }
        assert_eq!(
            HttpAppError::from(TokenError::Signing("key".to_string()))
                .0
                .http_status_code(),
            500
        );
    }

    #[test]
    fn test_unauthorized_and_not_found_have_empty_bodies() {
        let response = render_error(&AppError::Unauthorized("bad key".to_string()));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());

        let response = render_error(&AppError::NotFound("abc".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_bad_request_carries_text_message() {
        let response = render_error(&AppError::bad_request("Wrong url encoding"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}

//! Per-request diagnostic context.
//!
//! Every download endpoint finishes through [`RequestContext::finish`], which is
//! the only place a request outcome is logged. Failures are logged once, at the
//! level their [`ErrorMetadata`] declares, with the request's method, path,
//! blob id and (when known) the authenticated user.

use crate::error::{error_response_with_context, HttpAppError};
use crate::utils::download_path::raw_blob_id;
use axum::{
    http::{request::Parts, Method, StatusCode},
    response::Response,
};
use blobgate_core::{AppError, ErrorMetadata, Identity, LogLevel};

const NO_USER: &str = "-";

#[derive(Debug, Clone)]
pub struct RequestContext {
    action: &'static str,
    method: Method,
    path: String,
    blob_id: Option<String>,
    identity: Option<Identity>,
}

impl RequestContext {
    pub fn new(action: &'static str, parts: &Parts) -> Self {
        let path = parts.uri.path().to_string();
        Self {
            action,
            method: parts.method.clone(),
            blob_id: raw_blob_id(&path).map(str::to_string),
            path,
            identity: None,
        }
    }

    /// Record the identity once authentication succeeded.
    pub fn set_identity(&mut self, identity: &Identity) {
        self.identity = Some(identity.clone());
    }

    pub fn blob_id(&self) -> Option<&str> {
        self.blob_id.as_deref()
    }

    fn user(&self) -> &str {
        self.identity
            .as_ref()
            .map(Identity::user)
            .unwrap_or(NO_USER)
    }

    fn blob(&self) -> &str {
        self.blob_id.as_deref().unwrap_or(NO_USER)
    }

    /// Turn a pipeline outcome into the response, logging it exactly once.
    pub fn finish(self, result: Result<Response, HttpAppError>) -> Response {
        match result {
            Ok(response) => {
                self.log_success(response.status());
                response
            }
            Err(error) => error_response_with_context(error, &self),
        }
    }

    fn log_success(&self, status: StatusCode) {
        tracing::debug!(
            action = self.action,
            method = %self.method,
            path = %self.path,
            blob_id = %self.blob(),
            user = %self.user(),
            status = status.as_u16(),
            "Request handled"
        );
    }

    pub(crate) fn log_failure(&self, error: &AppError) {
        let status = error.http_status_code();
        let category = error.category();
        match error.log_level() {
            LogLevel::Info => tracing::info!(
                action = self.action,
                method = %self.method,
                path = %self.path,
                blob_id = %self.blob(),
                user = %self.user(),
                status,
                category = %category,
                error = %error,
                "Request rejected"
            ),
            LogLevel::Warn => tracing::warn!(
                action = self.action,
                method = %self.method,
                path = %self.path,
                blob_id = %self.blob(),
                user = %self.user(),
                status,
                category = %category,
                error = %error.detailed_message(),
                "Malformed request"
            ),
            LogLevel::Error => tracing::error!(
                action = self.action,
                method = %self.method,
                path = %self.path,
                blob_id = %self.blob(),
                user = %self.user(),
                status,
                category = %category,
                error = %error.detailed_message(),
                "Request failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use blobgate_core::AuthMethod;

    fn parts(method: Method, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_context_captures_raw_blob_id() {
        let ctx = RequestContext::new("download", &parts(Method::GET, "/download/abc123/a%20b.txt"));
        assert_eq!(ctx.blob_id(), Some("abc123"));
        assert_eq!(ctx.user(), "-");
    }

    #[test]
    fn test_finish_renders_failure() {
        let mut ctx = RequestContext::new("download", &parts(Method::GET, "/download/abc123"));
        ctx.set_identity(&Identity::new("alice", AuthMethod::ApiKey));
        assert_eq!(ctx.user(), "alice");

        let response = ctx.finish(Err(HttpAppError(AppError::NotFound("abc123".to_string()))));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

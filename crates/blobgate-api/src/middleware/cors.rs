//! Cross-origin headers for the download endpoints.
//!
//! The same [`CorsPolicy`] answers `OPTIONS` preflights and decorates the
//! responses of the real `GET` and `POST` requests.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, Accept";
const ANY_ORIGIN: &str = "*";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_any_origin: bool,
    origins: Vec<HeaderValue>,
}

impl CorsPolicy {
    /// Build from configured origins; `*` allows any origin.
    pub fn new(origins: &[String]) -> Self {
        let allow_any_origin = origins.iter().any(|o| o == ANY_ORIGIN);
        let origins = origins
            .iter()
            .filter(|o| o.as_str() != ANY_ORIGIN)
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        Self {
            allow_any_origin,
            origins,
        }
    }

    /// The `Access-Control-Allow-Origin` value for a request, if it is allowed.
    fn allow_origin(&self, request_headers: &HeaderMap) -> Option<HeaderValue> {
        if self.allow_any_origin {
            return Some(HeaderValue::from_static(ANY_ORIGIN));
        }
        let origin = request_headers.get(header::ORIGIN)?;
        self.origins.iter().find(|o| *o == origin).cloned()
    }

    /// Add the CORS headers for a request to a response's headers.
    pub fn apply(&self, request_headers: &HeaderMap, response_headers: &mut HeaderMap) {
        if let Some(origin) = self.allow_origin(request_headers) {
            response_headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        if !self.allow_any_origin {
            response_headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
        response_headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        response_headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
    }
}

/// Adds CORS headers to every response, failures included.
pub async fn cors_headers_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let request_headers = request.headers().clone();
    let mut response = next.run(request).await;
    policy.apply(&request_headers, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_headers(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers
    }

    #[test]
    fn test_wildcard_policy() {
        let policy = CorsPolicy::new(&["*".to_string()]);
        let mut response = HeaderMap::new();
        policy.apply(&origin_headers("https://mail.example.com"), &mut response);

        assert_eq!(response[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(response[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
        assert!(response.get(header::VARY).is_none());
    }

    #[test]
    fn test_listed_origin_is_echoed() {
        let policy = CorsPolicy::new(&["https://mail.example.com".to_string()]);
        let mut response = HeaderMap::new();
        policy.apply(&origin_headers("https://mail.example.com"), &mut response);

        assert_eq!(
            response[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://mail.example.com"
        );
        assert_eq!(response[header::VARY], "Origin");
    }

    #[test]
    fn test_unlisted_origin_gets_no_allow_origin() {
        let policy = CorsPolicy::new(&["https://mail.example.com".to_string()]);
        let mut response = HeaderMap::new();
        policy.apply(&origin_headers("https://evil.example.net"), &mut response);

        assert!(response.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}

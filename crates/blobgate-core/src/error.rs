//! Error types module
//!
//! All failures of the download gateway are unified under [`AppError`]. Each
//! variant self-describes how it is presented over HTTP through
//! [`ErrorMetadata`], so the HTTP layer only has to render what it is told.

use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected outcomes such as a missing blob or a rejected credential
    Info,
    /// Client mistakes such as malformed request paths
    Warn,
    /// Unexpected failures
    Error,
}

/// Coarse failure taxonomy. Every [`AppError`] belongs to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Unauthorized,
    NotFound,
    MalformedRequest,
    Internal,
}

impl Display for FailureCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FailureCategory::Unauthorized => write!(f, "unauthorized"),
            FailureCategory::NotFound => write!(f, "not_found"),
            FailureCategory::MalformedRequest => write!(f, "malformed_request"),
            FailureCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// Failure category the error belongs to
    fn category(&self) -> FailureCategory;

    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Client-facing body, `None` when the response body must stay empty
    fn client_message(&self) -> Option<String>;

    /// Whether details must never reach the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Bad request that keeps the underlying error for diagnostics.
    pub fn bad_request_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AppError::BadRequest {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Storage failure that keeps the backend error as its cause.
    pub fn storage<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AppError::Storage {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Get the error type name for log records
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::BadRequest { .. } => "BadRequest",
            AppError::Storage { .. } => "Storage",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (category, http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (FailureCategory, u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Unauthorized(_) => (
            FailureCategory::Unauthorized,
            401,
            "UNAUTHORIZED",
            false,
            LogLevel::Info,
        ),
        AppError::NotFound(_) => (
            FailureCategory::NotFound,
            404,
            "NOT_FOUND",
            false,
            LogLevel::Info,
        ),
        AppError::BadRequest { .. } => (
            FailureCategory::MalformedRequest,
            400,
            "BAD_REQUEST",
            false,
            LogLevel::Warn,
        ),
        AppError::Storage { .. } => (
            FailureCategory::Internal,
            500,
            "STORAGE_ERROR",
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            FailureCategory::Internal,
            500,
            "INTERNAL_ERROR",
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn category(&self) -> FailureCategory {
        app_error_static_metadata(self).0
    }

    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).1
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> Option<String> {
        match self {
            AppError::Unauthorized(_) | AppError::NotFound(_) => None,
            AppError::BadRequest { message, .. } => Some(message.clone()),
            AppError::Storage { .. } | AppError::Internal(_) => {
                Some("Internal server error".to_string())
            }
        }
    }
}

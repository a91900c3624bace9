//! Blobgate Core Library
//!
//! This crate provides the domain models, error types and configuration that are
//! shared by the storage backends and the HTTP gateway.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, GatewayConfig};
pub use error::{AppError, ErrorMetadata, FailureCategory, LogLevel};
pub use models::{AuthMethod, BlobId, Identity};
pub use storage_types::StorageBackend;

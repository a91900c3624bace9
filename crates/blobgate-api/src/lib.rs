//! Blobgate API Library
//!
//! This crate provides the download gateway's HTTP handlers, authentication,
//! streaming and application setup.

pub mod auth;
pub mod context;
pub mod error;
mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod streaming;
mod telemetry;
pub mod token;
pub mod utils;

pub use error::HttpAppError;
pub use state::AppState;

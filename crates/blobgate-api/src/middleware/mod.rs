pub mod cors;
pub mod security_headers;

pub use cors::{cors_headers_middleware, CorsPolicy};
pub use security_headers::security_headers_middleware;

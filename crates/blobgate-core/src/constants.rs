//! Constants shared across crates.

/// Size of every body chunk read from a blob stream (16 KiB).
pub const DOWNLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// URL prefix of the download endpoints.
pub const DOWNLOAD_PREFIX: &str = "/download";

/// Content type of a serialized attachment access token.
pub const TEXT_PLAIN_CONTENT_TYPE: &str = "text/plain";

/// Query parameter carrying an attachment access token on unauthenticated downloads.
pub const ACCESS_TOKEN_QUERY_PARAM: &str = "access_token";

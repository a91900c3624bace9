//! Parsing of `/download/{blobId}[/{name}]` request paths.
//!
//! The blob id is taken verbatim from the path. The optional name segment is
//! form-decoded (`+` means a space, then `%XX` escapes) and must be valid UTF-8.

use blobgate_core::constants::DOWNLOAD_PREFIX;
use blobgate_core::{AppError, BlobId};
use percent_encoding::percent_decode_str;

/// Client-facing message for an undecodable name segment.
pub const WRONG_URL_ENCODING: &str = "Wrong url encoding";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPath {
    pub blob_id: BlobId,
    pub name: Option<String>,
}

impl DownloadPath {
    /// Resolve a request path into the blob id and the decoded name, if any.
    pub fn resolve(path: &str) -> Result<Self, AppError> {
        let (blob_id, name) = split_segments(path)
            .ok_or_else(|| AppError::bad_request(format!("Not a download path: {}", path)))?;

        let blob_id = BlobId::new(blob_id)?;
        let name = name.map(decode_name).transpose()?;

        Ok(Self { blob_id, name })
    }
}

/// Resolve only the blob id, leaving any name segment undecoded.
pub fn resolve_blob_id(path: &str) -> Result<BlobId, AppError> {
    let (blob_id, _) = split_segments(path)
        .ok_or_else(|| AppError::bad_request(format!("Not a download path: {}", path)))?;
    BlobId::new(blob_id)
}

/// The raw blob id segment of a download path, if the path has one.
pub fn raw_blob_id(path: &str) -> Option<&str> {
    split_segments(path).map(|(blob_id, _)| blob_id)
}

fn split_segments(path: &str) -> Option<(&str, Option<&str>)> {
    let rest = path.strip_prefix(DOWNLOAD_PREFIX)?.strip_prefix('/')?;
    let mut segments = rest.splitn(2, '/');
    let blob_id = segments.next().filter(|s| !s.is_empty())?;
    match segments.next() {
        None => Some((blob_id, None)),
        Some(name) if !name.is_empty() && !name.contains('/') => Some((blob_id, Some(name))),
        Some(_) => None,
    }
}

/// Form-decode a name segment.
pub fn decode_name(raw: &str) -> Result<String, AppError> {
    if has_malformed_escape(raw) {
        return Err(AppError::bad_request(WRONG_URL_ENCODING));
    }
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| AppError::bad_request_with_source(WRONG_URL_ENCODING, e))
}

/// `%` must always be followed by two hex digits.
fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::ErrorMetadata;

    #[test]
    fn test_resolve_blob_only() {
        let path = DownloadPath::resolve("/download/abc123").unwrap();
        assert_eq!(path.blob_id.as_str(), "abc123");
        assert_eq!(path.name, None);
    }

    #[test]
    fn test_resolve_with_name() {
        let path = DownloadPath::resolve("/download/abc123/report%20Q1.pdf").unwrap();
        assert_eq!(path.blob_id.as_str(), "abc123");
        assert_eq!(path.name.as_deref(), Some("report Q1.pdf"));
    }

    #[test]
    fn test_plus_decodes_to_space() {
        assert_eq!(decode_name("a+b%2Bc").unwrap(), "a b+c");
    }

    #[test]
    fn test_utf8_name() {
        assert_eq!(decode_name("r%C3%A9sum%C3%A9.pdf").unwrap(), "résumé.pdf");
    }

    #[test]
    fn test_blob_id_is_not_decoded() {
        let path = DownloadPath::resolve("/download/a%2Fb/x").unwrap();
        assert_eq!(path.blob_id.as_str(), "a%2Fb");
    }

    #[test]
    fn test_invalid_utf8_is_wrong_url_encoding() {
        let err = DownloadPath::resolve("/download/abc123/%C3%28").unwrap_err();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message().as_deref(), Some(WRONG_URL_ENCODING));
    }

    #[test]
    fn test_malformed_escape_is_wrong_url_encoding() {
        for raw in ["bad%zz", "trailing%", "short%4"] {
            let err = decode_name(raw).unwrap_err();
            assert_eq!(err.client_message().as_deref(), Some(WRONG_URL_ENCODING));
        }
    }

    #[test]
    fn test_rejects_non_download_paths() {
        for path in ["/", "/download", "/download/", "/download//x", "/download/a/b/c", "/other/abc"] {
            assert!(DownloadPath::resolve(path).is_err(), "{path}");
        }
    }

    #[test]
    fn test_resolve_blob_id_ignores_name() {
        let id = resolve_blob_id("/download/abc123/%C3%28").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_raw_blob_id() {
        assert_eq!(raw_blob_id("/download/abc123/x"), Some("abc123"));
        assert_eq!(raw_blob_id("/health"), None);
    }
}

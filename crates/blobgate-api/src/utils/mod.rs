pub mod content_disposition;
pub mod download_path;

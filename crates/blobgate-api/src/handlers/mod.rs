pub mod attachment_token;
pub mod download;
pub mod health;
pub mod preflight;

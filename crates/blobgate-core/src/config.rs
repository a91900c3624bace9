//! Configuration module
//!
//! Configuration is read from the environment (after loading an optional
//! `.env` file) and validated once at startup.

use std::env;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const TOKEN_TTL_SECONDS: u64 = 300;
const MIN_TOKEN_SECRET_LEN: usize = 32;
const MIN_API_KEY_LEN: usize = 16;
const LOCAL_STORAGE_PATH: &str = "./data/blobs";

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    /// HMAC secret used to sign attachment access tokens
    pub token_secret: String,
    pub token_ttl_seconds: u64,
    /// (user, api key) pairs accepted as bearer credentials
    pub api_keys: Vec<(String, String)>,
    /// `json` for structured logs, anything else for compact console output
    pub log_format: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GatewayConfig>);

impl Config {
    fn as_gateway(&self) -> &GatewayConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GatewayConfig::from_env()?;
        let config = Config(Box::new(config));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_gateway().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_gateway().server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_gateway().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_gateway().cors_origins
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_gateway().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_gateway().local_storage_path
    }

    pub fn token_secret(&self) -> &str {
        &self.as_gateway().token_secret
    }

    pub fn token_ttl_seconds(&self) -> u64 {
        self.as_gateway().token_ttl_seconds
    }

    pub fn api_keys(&self) -> &[(String, String)] {
        &self.as_gateway().api_keys
    }

    pub fn log_format(&self) -> &str {
        &self.as_gateway().log_format
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Local,
        };

        let api_keys = match env::var("API_KEYS") {
            Ok(value) => parse_api_keys(&value)?,
            Err(_) => Vec::new(),
        };

        Ok(GatewayConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            token_secret: env::var("TOKEN_SECRET").map_err(|_| {
                anyhow::anyhow!("TOKEN_SECRET must be set to sign attachment access tokens")
            })?,
            token_ttl_seconds: env::var("TOKEN_TTL_SECONDS")
                .unwrap_or_else(|_| TOKEN_TTL_SECONDS.to_string())
                .parse()
                .unwrap_or(TOKEN_TTL_SECONDS),
            api_keys,
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "TOKEN_SECRET must be at least {} characters long",
                MIN_TOKEN_SECRET_LEN
            ));
        }

        if self.token_ttl_seconds == 0 {
            return Err(anyhow::anyhow!("TOKEN_TTL_SECONDS must be greater than 0"));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        for (user, key) in &self.api_keys {
            if key.len() < MIN_API_KEY_LEN {
                return Err(anyhow::anyhow!(
                    "API key for user '{}' must be at least {} characters long",
                    user,
                    MIN_API_KEY_LEN
                ));
            }
        }

        Ok(())
    }
}

/// Parse `user:key,user:key` into pairs. The key may itself contain `:`.
fn parse_api_keys(value: &str) -> Result<Vec<(String, String)>, anyhow::Error> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (user, key) = entry
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("API_KEYS entries must look like user:key"))?;
            let (user, key) = (user.trim(), key.trim());
            if user.is_empty() || key.is_empty() {
                return Err(anyhow::anyhow!("API_KEYS entries must look like user:key"));
            }
            Ok((user.to_string(), key.to_string()))
        })
        .collect()
}

//! Marketplace API configuration module.
//!
//! Configuration is loaded from environment variables (after an optional
//! `.env` file) with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Marketplace API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listening port
    pub http_port: u16,

    /// HTTP listening address
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Root directory of the filesystem object store
    pub image_storage_dir: PathBuf,

    /// Externally reachable base URL, used for redirect and webhook URLs
    pub public_base_url: String,

    /// Whether order creation calls the payment provider
    pub payment_enabled: bool,

    /// Payment provider base URL
    pub payment_api_base_url: Option<String>,

    /// Payment provider API key
    pub payment_api_key: Option<String>,

    /// Currency code sent to the payment provider
    pub payment_currency: String,

    /// Request body limit for image uploads (default: 10MB)
    pub max_upload_bytes: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            http_port: var("HTTP_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            bind_addr: var("BIND_ADDR", "0.0.0.0"),

            database_path: PathBuf::from(var("DATABASE_PATH", "./data/marketplace.db")),

            db_max_connections: var("DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            image_storage_dir: PathBuf::from(var("IMAGE_STORAGE_DIR", "./data/images")),

            public_base_url: var("PUBLIC_BASE_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),

            payment_enabled: var("PAYMENT_ENABLED", "false")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYMENT_ENABLED".to_string()))?,

            payment_api_base_url: lookup("PAYMENT_API_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string()),

            payment_api_key: lookup("PAYMENT_API_KEY").filter(|v| !v.trim().is_empty()),

            payment_currency: var("PAYMENT_CURRENCY", market_core::DEFAULT_CURRENCY),

            max_upload_bytes: var("MAX_UPLOAD_BYTES", "10485760") // 10MB
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))
    }
}

impl Default for ApiConfig {
    /// The configuration `load()` yields with no variables set.
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            bind_addr: "0.0.0.0".to_string(),
            database_path: PathBuf::from("./data/marketplace.db"),
            db_max_connections: 5,
            image_storage_dir: PathBuf::from("./data/images"),
            public_base_url: "http://localhost:8080".to_string(),
            payment_enabled: false,
            payment_api_base_url: None,
            payment_api_key: None,
            payment_currency: market_core::DEFAULT_CURRENCY.to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

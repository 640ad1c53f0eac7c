//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// HS256 signing key for bearer tokens
    pub jwt_sign_key: String,

    /// Lifetime of issued tokens
    pub jwt_token_ttl: Duration,

    /// Salt mixed into password hashes
    pub hasher_salt: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_sign_key = env::var("JWT_SIGN_KEY")
            .map_err(|_| ConfigError::MissingEnv("JWT_SIGN_KEY"))?;
        if jwt_sign_key.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SIGN_KEY"));
        }

        let jwt_token_ttl_secs: u64 = env::var("JWT_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_TOKEN_TTL_SECS"))?;
        if jwt_token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue("JWT_TOKEN_TTL_SECS"));
        }

        let hasher_salt = env::var("HASHER_SALT")
            .map_err(|_| ConfigError::MissingEnv("HASHER_SALT"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            jwt_sign_key,
            jwt_token_ttl: Duration::from_secs(jwt_token_ttl_secs),
            hasher_salt,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_max_connections", &self.database_max_connections)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("jwt_token_ttl", &self.jwt_token_ttl)
            .finish_non_exhaustive()
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

//! Configuration management for the Basket Stock server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with BASKET_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Database URLs with this prefix select the in-memory row store
pub const MEMORY_STORE_PREFIX: &str = "memory:";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// PIN gate and session token configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, or `memory:` for the in-memory store
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_STORE_PREFIX)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Plain access PIN; empty disables the gate unless `pin_hash` is set
    pub pin: String,

    /// bcrypt hash of the access PIN
    pub pin_hash: String,

    /// Secret key for signing session tokens; required once a PIN is set
    #[serde(default)]
    pub jwt_secret: String,

    /// Session token expiration in seconds
    pub session_expiry: i64,
}

impl AuthConfig {
    /// Whether requests must carry a session token
    pub fn pin_required(&self) -> bool {
        !self.pin.is_empty() || !self.pin_hash.is_empty()
    }

    /// A PIN without a signing secret would let anyone mint a session
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.pin_required() && self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be set when an access PIN is configured".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BASKET_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", MEMORY_STORE_PREFIX)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("auth.pin", "")?
            .set_default("auth.pin_hash", "")?
            .set_default("auth.session_expiry", 43200)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BASKET_ prefix)
            .add_source(
                Environment::with_prefix("BASKET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.auth.check()?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for service tests: in-memory store, no PIN
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: MEMORY_STORE_PREFIX.to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            auth: AuthConfig {
                pin: String::new(),
                pin_hash: String::new(),
                jwt_secret: "test-secret".to_string(),
                session_expiry: 3600,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_without_secret_is_rejected() {
        let mut auth = Config::for_tests().auth;
        auth.pin = "4321".to_string();
        auth.jwt_secret = "  ".to_string();
        assert!(matches!(auth.check(), Err(ConfigError::Message(_))));

        auth.pin.clear();
        auth.pin_hash = "$2b$04$abcdefghijklmnopqrstuv".to_string();
        assert!(auth.check().is_err());

        auth.jwt_secret = "s3cret".to_string();
        assert!(auth.check().is_ok());
    }

    #[test]
    fn test_open_mode_needs_no_secret() {
        let mut auth = Config::for_tests().auth;
        auth.jwt_secret.clear();
        assert!(!auth.pin_required());
        assert!(auth.check().is_ok());
    }
}

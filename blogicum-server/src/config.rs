//! Server configuration
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. a TOML file (optional)
//! 3. environment variables (`DATABASE_URL`, `BLOGICUM_*`)
//!
//! Command-line flags are applied on top by the binary.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum length of the session signing key
const MIN_SECRET_LEN: usize = 32;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Blog server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// HMAC key for session cookies
    pub secret_key: String,

    /// Posts per listing page
    pub posts_per_page: u32,

    /// How long a rendered index page stays cached
    pub index_cache_ttl_secs: u64,

    /// Session lifetime
    pub session_ttl_secs: u64,

    /// Request timeout
    pub request_timeout_secs: u64,

    pub max_connections: u32,

    /// Allow any origin (default: false = localhost only)
    pub cors_permissive: bool,

    /// Mark the session cookie `Secure` (serve behind HTTPS)
    pub secure_cookies: bool,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/blogicum".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            secret_key: String::new(),
            posts_per_page: 10,
            index_cache_ttl_secs: 20,
            session_ttl_secs: 14 * 24 * 60 * 60,
            request_timeout_secs: 30,
            max_connections: crate::db::pool::DEFAULT_MAX_CONNECTIONS,
            cors_permissive: false,
            secure_cookies: false,
        }
    }
}

impl BlogConfig {
    /// Load from an optional TOML file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Override fields from environment variables looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("BLOGICUM_DATABASE_URL").or_else(|| var("DATABASE_URL")) {
            self.database_url = url;
        }
        if let Some(addr) = var("BLOGICUM_BIND") {
            self.bind_addr = parse_env("BLOGICUM_BIND", &addr)?;
        }
        if let Some(secret) = var("BLOGICUM_SECRET_KEY") {
            self.secret_key = secret;
        }
        if let Some(n) = var("BLOGICUM_POSTS_PER_PAGE") {
            self.posts_per_page = parse_env("BLOGICUM_POSTS_PER_PAGE", &n)?;
        }
        if let Some(secs) = var("BLOGICUM_INDEX_CACHE_TTL") {
            self.index_cache_ttl_secs = parse_env("BLOGICUM_INDEX_CACHE_TTL", &secs)?;
        }
        if let Some(secs) = var("BLOGICUM_SESSION_TTL") {
            self.session_ttl_secs = parse_env("BLOGICUM_SESSION_TTL", &secs)?;
        }
        if let Some(flag) = var("BLOGICUM_SECURE_COOKIES") {
            self.secure_cookies = parse_env("BLOGICUM_SECURE_COOKIES", &flag)?;
        }
        Ok(())
    }

    /// Check the settings the server cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                key: "secret_key",
                reason: format!(
                    "must be at least {} bytes (set BLOGICUM_SECRET_KEY)",
                    MIN_SECRET_LEN
                ),
            });
        }
        if self.posts_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                key: "posts_per_page",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    pub fn index_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.index_cache_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_env<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })
}

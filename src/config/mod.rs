use std::env;
use std::fmt;

use thiserror::Error;

/// Default listening port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Tokens are valid for one hour from issuance.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60;

/// Upper bound accepted for `TOKEN_TTL_SECS` (30 days).
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Origins allowed to call the API with credentials.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "https://blog-portal.web.app"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Absent only when the process runs against the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
}

// Keep the signing secret out of logs.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("cors_origins", &self.cors_origins)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let token_secret = lookup("ACCESS_TOKEN_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;

        let mut config = match environment {
            Environment::Production => Self::production(token_secret),
            Environment::Development => Self::development(token_secret),
        };

        if let Some(url) = lookup("DATABASE_URL") {
            url::Url::parse(&url).map_err(|e| ConfigError::Invalid {
                key: "DATABASE_URL",
                reason: e.to_string(),
            })?;
            config.database.url = Some(url);
        }
        if let Some(v) = lookup("PORT") {
            config.server.port = parse_value("PORT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            config.database.connection_timeout_secs = parse_value("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("TOKEN_TTL_SECS") {
            let ttl: u64 = parse_value("TOKEN_TTL_SECS", &v)?;
            if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
                return Err(ConfigError::Invalid {
                    key: "TOKEN_TTL_SECS",
                    reason: format!("must be between 1 and {} seconds", MAX_TOKEN_TTL_SECS),
                });
            }
            config.security.token_ttl_secs = ttl;
        }
        if let Some(v) = lookup("COOKIE_SECURE") {
            config.security.cookie_secure = parse_value("COOKIE_SECURE", &v)?;
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            config.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Returns the database URL, failing when the PostgreSQL store was requested without one.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    fn development(token_secret: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: DEFAULT_PORT },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            security: SecurityConfig {
                token_secret,
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
                cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
                cookie_secure: true,
            },
        }
    }

    fn production(token_secret: String) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: DEFAULT_PORT },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            security: SecurityConfig {
                token_secret,
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
                cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
                cookie_secure: true,
            },
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

// Runtime configuration
// Read once at startup from the environment (and an optional .env file)

use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which repository adapters back the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL through sqlx (default)
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => write!(f, "postgres"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    pub blacklist_prune_interval_secs: u64,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup
    ///
    /// Kept separate from [`Config::from_env`] so tests never have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = parse_or(&lookup, "STORAGE", StorageBackend::Postgres)?;

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let access_token_expiry_secs = parse_or(&lookup, "JWT_ACCESS_TOKEN_EXPIRY_SECS", 300)?;
        let refresh_token_expiry_secs =
            parse_or(&lookup, "JWT_REFRESH_TOKEN_EXPIRY_SECS", 86_400)?;

        for (var, value) in [
            ("JWT_ACCESS_TOKEN_EXPIRY_SECS", access_token_expiry_secs),
            ("JWT_REFRESH_TOKEN_EXPIRY_SECS", refresh_token_expiry_secs),
        ] {
            if value <= 0 {
                return Err(ConfigError::InvalidValue {
                    var: var.to_string(),
                    message: "must be positive".to_string(),
                });
            }
        }

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;
        let blacklist_prune_interval_secs =
            parse_or(&lookup, "BLACKLIST_PRUNE_INTERVAL_SECS", 3_600)?;
        if blacklist_prune_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "BLACKLIST_PRUNE_INTERVAL_SECS".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                var: "BCRYPT_COST".to_string(),
                message: "must be between 4 and 31".to_string(),
            });
        }

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8000)?;

        Ok(Config {
            storage,
            database_url,
            database_max_connections,
            jwt_secret,
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            blacklist_prune_interval_secs,
            bcrypt_cost,
            host,
            port,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub db_max_connections: u32,
    pub db_query_timeout_secs: u64,
}

impl Config {
    /// Loads `.env` (if present) and reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| AppError::InternalServerError(format!("{} must be set", key)))
        };

        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", 12)?;
        token_ttl(token_ttl_hours)?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8000)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            token_ttl_hours,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            db_query_timeout_secs: parse_or(&lookup, "DB_QUERY_TIMEOUT_SECS", 5)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.db_query_timeout_secs)
    }

    /// Lifetime of issued tokens.
    pub fn token_ttl(&self) -> Result<chrono::Duration, AppError> {
        token_ttl(self.token_ttl_hours)
    }
}

/// Token lifetimes must be positive and representable as a `chrono::Duration`.
fn token_ttl(hours: i64) -> Result<chrono::Duration, AppError> {
    if hours <= 0 {
        return Err(AppError::InternalServerError(
            "TOKEN_TTL_HOURS must be greater than zero".into(),
        ));
    }
    chrono::Duration::try_hours(hours).ok_or_else(|| {
        AppError::InternalServerError("TOKEN_TTL_HOURS is out of range".into())
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} must be a number", key))),
        None => Ok(default),
    }
}

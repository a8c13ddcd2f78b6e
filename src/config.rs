use std::str::FromStr;

use sqlx::postgres::PgSslMode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let ssl_mode = match lookup("DATABASE_SSL_MODE") {
            Some(v) => PgSslMode::from_str(&v).map_err(|_| ConfigError::Invalid {
                name: "DATABASE_SSL_MODE",
                value: v,
            })?,
            None => PgSslMode::Require,
        };

        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", &lookup, 10)?;

        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("PORT") {
            Some(v) => parse_value("PORT", v)?,
            None => parse_or("APP_PORT", &lookup, 3000)?,
        };

        Ok(Self {
            database: DatabaseConfig {
                url,
                ssl_mode,
                max_connections,
            },
            host,
            port,
        })
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) => parse_value(name, v),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { name, value })
}

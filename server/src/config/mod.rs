use std::env;
use std::fmt::Display;
use std::str::FromStr;

use axum_extra::extract::cookie::Key;
use thiserror::Error;
use tracing::{info, warn};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/commune_events";
const MEMORY_DATABASE_URL: &str = "memory://";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
pub const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("SESSION_SECRET must be at least 64 bytes")]
    SessionSecretTooShort,

    #[error("SESSION_SECRET is required in production")]
    MissingSessionSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub port: u16,
    /// `RUST_ENV=production`: HSTS and `Secure` session cookies.
    pub production: bool,
    pub session_key: Key,
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreBackend::Postgres(DEFAULT_DATABASE_URL.to_string()),
            port: DEFAULT_PORT,
            production: false,
            session_key: Key::generate(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let store = if database_url.starts_with(MEMORY_DATABASE_URL) {
            StoreBackend::Memory
        } else {
            StoreBackend::Postgres(database_url)
        };

        let production = lookup("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                message: format!(
                    "{bcrypt_cost} is outside {MIN_BCRYPT_COST}..={MAX_BCRYPT_COST}"
                ),
            });
        }

        let secret = lookup("SESSION_SECRET").filter(|s| !s.trim().is_empty());
        let session_key = match secret {
            Some(secret) => {
                Key::try_from(secret.as_bytes()).map_err(|_| ConfigError::SessionSecretTooShort)?
            }
            None if production => return Err(ConfigError::MissingSessionSecret),
            None => {
                warn!("SESSION_SECRET not set, sessions will not survive a restart");
                Key::generate()
            }
        };

        let origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());

        let cors_allowed_origins = split_origins(&origins);
        if cors_allowed_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigError::Invalid {
                key: "CORS_ALLOWED_ORIGINS",
                message: "`*` cannot be combined with credentialed requests, list origins"
                    .to_string(),
            });
        }

        Ok(Self {
            store,
            port,
            production,
            session_key,
            bcrypt_cost,
            cors_allowed_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The JWT secret is shared with the external identity service that issues
//! client tokens; this service only ever verifies them.

use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8085;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_OPERATION_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS (localhost is always allowed)
    pub frontend_url: String,
    /// Database URL. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    /// Connection pool size
    pub db_max_connections: u32,
    /// Bound on establishing/acquiring a database connection
    pub db_connect_timeout: Duration,
    /// Bound on any single store operation
    pub db_operation_timeout: Duration,

    // --- Secrets ---
    /// HMAC secret shared with the token issuer (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// Only algorithm accepted when verifying tokens
    pub jwt_algorithm: Algorithm,
}

impl Config {
    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            database_url: None,
            db_max_connections: 1,
            db_connect_timeout: Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            db_operation_timeout: Duration::from_secs(DEFAULT_DB_OPERATION_TIMEOUT_SECS),
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jwt_algorithm: Algorithm::HS256,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(DEFAULT_PORT),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            database_url: env::var("DATABASE_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            db_connect_timeout: Duration::from_secs(
                parse_var("DB_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            ),
            db_operation_timeout: Duration::from_secs(
                parse_var("DB_OPERATION_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_DB_OPERATION_TIMEOUT_SECS),
            ),

            jwt_secret: env::var("JWT_SECRET_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))?
                .into_bytes(),
            jwt_algorithm: match env::var("JWT_ALGORITHM") {
                Ok(raw) => parse_algorithm(&raw)?,
                Err(_) => Algorithm::HS256,
            },
        })
    }
}

/// Read an optional variable and parse it, failing on garbage instead of
/// silently falling back to the default.
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Only the shared-secret HMAC family makes sense with `JWT_SECRET_KEY`.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::Invalid("JWT_ALGORITHM", raw.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

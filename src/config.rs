// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The environment is read exactly once at startup. Handlers only ever see
//! the resulting [`Config`] through `AppState`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or its emulator).
    Firestore,
    /// Process-local store, data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Store backend selection
    pub store_backend: StoreBackend,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Session token lifetime in days
    pub jwt_expire_days: i64,
    /// Session cookie lifetime in days
    pub cookie_expire_days: i64,
    /// Production mode: session cookies are marked `Secure`
    pub production: bool,

    /// Largest accepted photo upload, in bytes
    pub file_upload_max_size: usize,
    /// Directory uploaded photos are written to
    pub file_upload_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_or("PORT", 5000)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_backend: parse_or("STORE_BACKEND", StoreBackend::Firestore)?,

            jwt_signing_key: env::var("JWT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            jwt_expire_days: parse_days("JWT_EXPIRE_DAYS", 30)?,
            cookie_expire_days: parse_days("JWT_COOKIE_EXPIRE", 30)?,
            production: env::var("MODE").map(|m| m == "prod").unwrap_or(false),

            file_upload_max_size: parse_or("FILE_UPLOAD_MAX_SIZE", 1_000_000)?,
            file_upload_path: env::var("FILE_UPLOAD_PATH")
                .unwrap_or_else(|_| "public/uploads".to_string())
                .into(),
        })
    }

    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 5000,
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jwt_expire_days: 30,
            cookie_expire_days: 30,
            production: false,
            file_upload_max_size: 1_000_000,
            file_upload_path: env::temp_dir().join("bootcamp-api-uploads"),
        }
    }
}

/// Read `name` and parse it, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Longest session lifetime accepted from the environment, in days.
pub const MAX_EXPIRE_DAYS: i64 = 3650;

/// Parse a lifetime in days, rejecting values outside `0..=MAX_EXPIRE_DAYS`.
fn parse_days(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    let days = parse_or(name, default)?;
    if (0..=MAX_EXPIRE_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid(name))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

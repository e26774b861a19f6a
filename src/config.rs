//! Configuration loader for the `turbine-monitor` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional numeric variable with a default value.
macro_rules! parse_var {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string variable with a default value.
macro_rules! var_or {
    ($lookup:expr, $var_name:expr, $default:expr) => {
        $lookup($var_name).unwrap_or_else(|| $default.to_string())
    };
}

/// SQLite file used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://turbine_data.db?mode=rwc";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// SQLite connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server binds on `0.0.0.0`.
    pub http_port: u16,

    /// Request body limit for CSV uploads, in bytes.
    pub upload_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        // ---
        Config {
            db_url: DEFAULT_DATABASE_URL.to_string(),
            db_pool_max: 5,
            http_port: 8080,
            upload_max_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DATABASE_URL` – SQLite connection string (default: `sqlite://turbine_data.db?mode=rwc`)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `HTTP_PORT` – listen port (default: 8080)
/// - `UPLOAD_MAX_BYTES` – upload body limit (default: 64 MiB)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    load_with(|name| env::var(name).ok())
}

/// Build a [`Config`] from an arbitrary variable source.
fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let defaults = Config::default();

    let db_url = var_or!(lookup, "DATABASE_URL", defaults.db_url);
    let db_pool_max = parse_var!(lookup, "DB_POOL_MAX", u32, defaults.db_pool_max);
    let http_port = parse_var!(lookup, "HTTP_PORT", u16, defaults.http_port);
    let upload_max_bytes = parse_var!(
        lookup,
        "UPLOAD_MAX_BYTES",
        usize,
        defaults.upload_max_bytes
    );

    if db_pool_max == 0 {
        return Err(anyhow!("Invalid DB_POOL_MAX: must be at least 1"));
    }

    Ok(Config {
        db_url,
        db_pool_max,
        http_port,
        upload_max_bytes,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL     : {}", self.db_url);
        tracing::info!("  DB_POOL_MAX      : {}", self.db_pool_max);
        tracing::info!("  HTTP_PORT        : {}", self.http_port);
        tracing::info!("  UPLOAD_MAX_BYTES : {}", self.upload_max_bytes);
    }
}

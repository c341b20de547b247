//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is checked with
//! [`ClientConfig::validate`] before it is returned.
//!
//! ## Environment Variables
//! - `VOCALIS_BASE_URL`: versioned API root (required)
//! - `VOCALIS_DEVELOPER_ID`: value of the `Developer-Id` header (required)
//! - `VOCALIS_CLIENT_ID`: admin client id (required)
//! - `VOCALIS_CLIENT_SECRET`: admin client secret (required)
//! - `VOCALIS_TOKEN_TTL_SECS`: token lifetime in seconds
//! - `VOCALIS_POLL_MAX_MS`: convergence budget in milliseconds
//! - `VOCALIS_POLL_INTERVAL_MS`: pause between polls in milliseconds
//! - `VOCALIS_REQUEST_TIMEOUT_SECS`: per-request timeout in seconds
//! - `VOCALIS_MAX_TRANSPORT_ATTEMPTS`: attempts per request on connect failure
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./vocalis.json` or `./vocalis.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent directory
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use vocalis_domain::{ApiConfig, ClientConfig, PollingConfig, Result, TokenConfig, VocalisError};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["vocalis.json", "vocalis.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `VocalisError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The four `api` variables are required; the rest fall back to their
/// defaults when unset.
///
/// # Errors
/// Returns `VocalisError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut api = ApiConfig::new(
        env_var("VOCALIS_BASE_URL")?,
        env_var("VOCALIS_DEVELOPER_ID")?,
        env_var("VOCALIS_CLIENT_ID")?,
        env_var("VOCALIS_CLIENT_SECRET")?,
    );
    if let Some(timeout) = env_parse("VOCALIS_REQUEST_TIMEOUT_SECS")? {
        api.request_timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse("VOCALIS_MAX_TRANSPORT_ATTEMPTS")? {
        api.max_transport_attempts = attempts;
    }

    let mut token = TokenConfig::default();
    if let Some(ttl) = env_parse("VOCALIS_TOKEN_TTL_SECS")? {
        token.ttl_secs = ttl;
    }

    let mut polling = PollingConfig::default();
    if let Some(max) = env_parse("VOCALIS_POLL_MAX_MS")? {
        polling.max_duration_ms = max;
    }
    if let Some(interval) = env_parse("VOCALIS_POLL_INTERVAL_MS")? {
        polling.poll_interval_ms = interval;
    }

    let config = ClientConfig { api, token, polling };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `VocalisError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(VocalisError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            VocalisError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| VocalisError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(VocalisError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, then the directory
/// of the running executable, trying `vocalis.{json,toml}` before
/// `config.{json,toml}` in each.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    candidates_in(&roots).into_iter().find(|path| path.exists())
}

fn candidates_in(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `VocalisError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(VocalisError::Config(format!("Missing required environment variable: {}", key))),
    }
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| VocalisError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

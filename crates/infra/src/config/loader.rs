//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file; use defaults if none
//! 2. Apply `FFLBRO_*` environment overrides on top
//! 3. Validate the result
//!
//! Files may be TOML or JSON (detected by extension) and may be partial:
//! every section has defaults.
//!
//! ## Environment Variables
//! - `FFLBRO_DB_PATH`: Database file path
//! - `FFLBRO_DB_POOL_SIZE`: Connection pool size
//! - `FFLBRO_MOCK_MODE`: Use in-memory fixtures instead of SQLite (true/false)
//! - `FFLBRO_TAX_RATE`: Flat quote tax rate, e.g. `0.0825`
//! - `FFLBRO_QUOTE_EXPIRY_DAYS`: Quote validity in days
//! - `FFLBRO_LOG_LEVEL`: Default tracing level
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./fflbro.toml`, `./fflbro.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use fflbro_domain::{Config, FflBroError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["fflbro.toml", "fflbro.json", "config.toml", "config.json"];

/// Load configuration from the first config file found (or defaults), then
/// apply environment overrides and validate.
///
/// # Errors
/// Returns `FflBroError::Config` if a file exists but cannot be parsed, an
/// override has an invalid value, or validation fails.
pub fn load() -> Result<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `FflBroError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FflBroError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FflBroError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FflBroError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, detecting the format by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FflBroError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FflBroError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(FflBroError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Overlay `FFLBRO_*` environment variables onto `config`.
///
/// Unset variables leave the corresponding field untouched.
///
/// # Errors
/// Returns `FflBroError::Config` when a variable is set to an unparsable value.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(path) = env_opt("FFLBRO_DB_PATH") {
        config.database.path = path;
    }
    if let Some(pool_size) = env_parse("FFLBRO_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(mock_mode) = env_bool("FFLBRO_MOCK_MODE") {
        config.ledger.mock_mode = mock_mode;
    }
    if let Some(tax_rate) = env_parse("FFLBRO_TAX_RATE")? {
        config.ledger.tax_rate = tax_rate;
    }
    if let Some(days) = env_parse("FFLBRO_QUOTE_EXPIRY_DAYS")? {
        config.ledger.quote_expiry_days = days;
    }
    if let Some(level) = env_opt("FFLBRO_LOG_LEVEL") {
        config.logging.level = level;
    }
    Ok(())
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Non-empty environment variable value.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| FflBroError::Config(format!("Invalid value for {key} ({raw}): {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Returns `None` when unset.
fn env_bool(key: &str) -> Option<bool> {
    env_opt(key).map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

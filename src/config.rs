//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXVIEW_CONFIG` (environment variable)
//! 2. `~/.config/mboxview/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxview\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! A file that exists but cannot be read or parsed is reported to the caller,
//! which falls back to the defaults once logging is up.
//!
//! Command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MboxError, Result};
use crate::search::IdMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Listing defaults.
    pub query: QueryConfig,
    /// Performance tuning.
    pub performance: PerformanceConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override directory for the log file.
    pub log_dir: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Directory holding `index.html` and the `.js` / `.css` assets.
    pub static_dir: PathBuf,
    /// MBOX archive served when none is given on the command line.
    pub archive: PathBuf,
}

/// Listing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when the request has no `per_page`.
    pub default_per_page: i64,
    /// How listing ids are numbered.
    pub id_mode: IdMode,
}

/// Performance tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Read buffer size in bytes (default: 1048576 = 1 MB).
    pub read_buffer_size: usize,
    /// Maximum message size in bytes (default: 268435456 = 256 MB).
    pub max_message_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("web"),
            archive: PathBuf::from("emails.mbox"),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_per_page: 20,
            id_mode: IdMode::Absolute,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: crate::parser::mbox::READ_BUFFER_SIZE,
            max_message_size: crate::parser::mbox::MAX_MESSAGE_SIZE,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found. An unreadable or
/// unparseable file is an error; the caller decides whether to fall back.
pub fn load_config() -> Result<Config> {
    match config_file_path() {
        Some(path) => load_config_from(&path),
        None => Ok(Config::default()),
    }
}

/// Load configuration from `path`, or the defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| MboxError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| MboxError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MBOXVIEW_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mboxview").join("config.toml"))
}

/// Return the directory for the log file.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mboxview")
}

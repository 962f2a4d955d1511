//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment variables (`TK_PAGER`, `PAGER`; not handled here)
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$TK_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/tk/config.toml`
//! 3. `~/.tk/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use tankflow::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("jsonnet: {}", config.jsonnet_command());
//! println!("kubectl: {}", config.kubectl_command());
//! ```

pub mod schema;

pub use schema::{ConfigFile, DiffConfig, JsonnetConfig, KubectlConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::options::DiffStrategy;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TK_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with accessors that apply defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: ConfigFile,
    /// Path the file was loaded from
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// A missing config file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        let candidates = search_paths(|key| std::env::var(key).ok(), dirs::home_dir());
        match candidates.into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Evaluator executable.
    ///
    /// Defaults to "jsonnet".
    pub fn jsonnet_command(&self) -> &str {
        self.file
            .jsonnet
            .as_ref()
            .and_then(|j| j.command.as_deref())
            .unwrap_or("jsonnet")
    }

    /// Extra library search paths for the evaluator.
    pub fn jsonnet_jpath(&self) -> Vec<PathBuf> {
        self.file
            .jsonnet
            .as_ref()
            .and_then(|j| j.jpath.as_ref())
            .map(|paths| paths.iter().map(PathBuf::from).collect())
            .unwrap_or_default()
    }

    /// Cluster client executable.
    ///
    /// Defaults to "kubectl".
    pub fn kubectl_command(&self) -> &str {
        self.file
            .kubectl
            .as_ref()
            .and_then(|k| k.command.as_deref())
            .unwrap_or("kubectl")
    }

    /// Configured diff strategy, if any.
    pub fn diff_strategy(&self) -> Option<DiffStrategy> {
        self.file.diff.as_ref().and_then(|d| d.strategy)
    }

    /// Configured pager command line, if any.
    pub fn pager(&self) -> Option<&str> {
        self.file.diff.as_ref().and_then(|d| d.pager.as_deref())
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.file.interactive.unwrap_or(true)
    }

    /// Path of the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Candidate config file locations in search order.
fn search_paths(env: impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = env(CONFIG_ENV).filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    if let Some(xdg) = env("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(xdg).join("tk/config.toml"));
    }
    if let Some(home) = home {
        paths.push(home.join(".tk/config.toml"));
    }
    paths
}

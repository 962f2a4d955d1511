//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that an empty command name
//! is reported at startup instead of when the collaborator is spawned.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::options::DiffStrategy;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// interactive = true
///
/// [jsonnet]
/// command = "jsonnet"
/// jpath = ["/opt/jsonnet/lib"]
///
/// [kubectl]
/// command = "kubectl"
///
/// [diff]
/// strategy = "native"
/// pager = "less -RFX"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Default interactive mode
    pub interactive: Option<bool>,

    /// Evaluator settings
    pub jsonnet: Option<JsonnetConfig>,

    /// Cluster client settings
    pub kubectl: Option<KubectlConfig>,

    /// Diff defaults
    pub diff: Option<DiffConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(jsonnet) = &self.jsonnet {
            non_empty("jsonnet.command", jsonnet.command.as_deref())?;
        }
        if let Some(kubectl) = &self.kubectl {
            non_empty("kubectl.command", kubectl.command.as_deref())?;
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue(format!(
            "{} cannot be empty",
            key
        ))),
        _ => Ok(()),
    }
}

/// Evaluator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JsonnetConfig {
    /// Evaluator executable (default: "jsonnet")
    pub command: Option<String>,

    /// Additional library search paths
    pub jpath: Option<Vec<String>>,
}

/// Cluster client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KubectlConfig {
    /// Client executable (default: "kubectl")
    pub command: Option<String>,
}

/// Diff defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Strategy used when neither the flag nor the environment sets one
    pub strategy: Option<DiffStrategy>,

    /// Pager command line for interactive output
    pub pager: Option<String>,
}

//! eval
//!
//! The configuration evaluator: turns a source path plus evaluation options
//! into the environment whose resources the workflow commands operate on.
//!
//! # Modules
//!
//! - [`jsonnet`] - Evaluator backed by an external `jsonnet` executable
//! - [`environment`] - Environment metadata, inline environment selection
//!   and manifest processing
//!
//! # Design
//!
//! [`Evaluator`] only produces raw JSON. Everything that turns that JSON into
//! resources lives in [`environment`], so it is shared by every evaluator
//! implementation, including the [`StaticEvaluator`] used by tests.

pub mod environment;
pub mod jsonnet;

pub use environment::{load_environment, Environment};
pub use jsonnet::JsonnetEvaluator;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;

use crate::core::manifest::ManifestError;
use crate::core::options::EvalOpts;

/// Errors from evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no entrypoint found at '{}'", path.display())]
    EntrypointNotFound { path: PathBuf },

    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("evaluating '{}' failed:\n{stderr}", path.display())]
    Failed { path: PathBuf, stderr: String },

    #[error("evaluator produced invalid JSON: {0}")]
    InvalidOutput(String),

    #[error("invalid environment spec '{}': {message}", path.display())]
    InvalidSpec { path: PathBuf, message: String },

    #[error("invalid inline environment: {0}")]
    InvalidInlineEnvironment(String),

    #[error("found no environment named '{name}' (available: {available})")]
    EnvironmentNotFound { name: String, available: String },

    #[error("found multiple inline environments ({available}), select one with --name")]
    AmbiguousEnvironment { available: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Produces the raw JSON output for a source path.
pub trait Evaluator {
    fn eval(&self, path: &Path, opts: &EvalOpts) -> Result<Value, EvalError>;
}

/// Evaluator returning a fixed value, for tests.
///
/// Records every evaluated path so tests can assert whether evaluation
/// happened at all.
#[derive(Debug, Clone)]
pub struct StaticEvaluator {
    output: Value,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl StaticEvaluator {
    pub fn new(output: Value) -> Self {
        Self {
            output,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Paths evaluated so far.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Evaluator for StaticEvaluator {
    fn eval(&self, path: &Path, _opts: &EvalOpts) -> Result<Value, EvalError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_path_buf());
        Ok(self.output.clone())
    }
}

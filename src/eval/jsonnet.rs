//! eval::jsonnet
//!
//! Evaluator that shells out to a `jsonnet` executable.
//!
//! # Invocation
//!
//! ```text
//! jsonnet -J <dir> -J <dir>/lib -J <dir>/vendor [-J <jpath>...]
//!         [--ext-str k=v...] [--ext-code k=v...]
//!         [--tla-str k=v...] [--tla-code k=v...]
//!         [--max-stack N] <entrypoint>
//! ```
//!
//! The entrypoint is `<path>/main.jsonnet` for a directory and `<path>`
//! itself otherwise.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tracing::debug;

use super::{EvalError, Evaluator};
use crate::core::options::EvalOpts;

/// Entrypoint file looked up inside an environment directory.
pub const ENTRYPOINT: &str = "main.jsonnet";

/// Evaluator backed by an external executable.
#[derive(Debug, Clone)]
pub struct JsonnetEvaluator {
    command: String,
    jpath: Vec<PathBuf>,
}

impl JsonnetEvaluator {
    pub fn new(command: impl Into<String>, jpath: Vec<PathBuf>) -> Self {
        Self {
            command: command.into(),
            jpath,
        }
    }

    /// Build the argument list for evaluating `path`.
    pub fn args(&self, path: &Path, opts: &EvalOpts) -> Result<Vec<String>, EvalError> {
        let entrypoint = entrypoint(path)?;
        let dir = entrypoint
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut args = Vec::new();
        for jpath in [dir.clone(), dir.join("lib"), dir.join("vendor")]
            .iter()
            .chain(self.jpath.iter())
        {
            args.push("-J".to_string());
            args.push(jpath.display().to_string());
        }
        push_vars(&mut args, "--ext-str", &opts.ext_str);
        push_vars(&mut args, "--ext-code", &opts.ext_code);
        push_vars(&mut args, "--tla-str", &opts.tla_str);
        push_vars(&mut args, "--tla-code", &opts.tla_code);
        if let Some(max_stack) = opts.max_stack {
            args.push("--max-stack".to_string());
            args.push(max_stack.to_string());
        }
        args.push(entrypoint.display().to_string());
        Ok(args)
    }
}

impl Evaluator for JsonnetEvaluator {
    fn eval(&self, path: &Path, opts: &EvalOpts) -> Result<Value, EvalError> {
        let args = self.args(path, opts)?;
        debug!(command = %self.command, ?args, "evaluating");

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .map_err(|e| EvalError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(EvalError::Failed {
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| EvalError::InvalidOutput(e.to_string()))
    }
}

/// Resolve the file to evaluate for `path`.
pub fn entrypoint(path: &Path) -> Result<PathBuf, EvalError> {
    let file = if path.is_dir() {
        path.join(ENTRYPOINT)
    } else {
        path.to_path_buf()
    };
    if !file.is_file() {
        return Err(EvalError::EntrypointNotFound { path: file });
    }
    Ok(file)
}

fn push_vars(args: &mut Vec<String>, flag: &str, vars: &BTreeMap<String, String>) {
    for (key, value) in vars {
        args.push(flag.to_string());
        args.push(format!("{}={}", key, value));
    }
}

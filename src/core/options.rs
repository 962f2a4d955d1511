//! core::options
//!
//! Per-invocation option values and the assembler that builds them.
//!
//! # Design
//!
//! Parsed command-line flags arrive as a [`Flags`] value. Assembly is a pure
//! function: it compiles the target selectors, applies documented defaults
//! and rejects empty values, but never touches the network or the disk.
//!
//! Each command gets its own options type, so fields that are meaningless
//! for a command (a diff strategy for `apply`, say) cannot be set:
//!
//! | command | type          | command-specific fields                          |
//! |---------|---------------|--------------------------------------------------|
//! | apply   | [`ApplyOpts`] | force, validate, auto_approve, diff_to_file      |
//! | delete  | [`DeleteOpts`]| force, validate, auto_approve, diff_to_file      |
//! | prune   | [`PruneOpts`] | force, auto_approve, diff_to_file                |
//! | diff    | [`DiffOpts`]  | strategy, summarize, with_prune, exit_zero, diff_to_file |
//! | show    | [`Opts`]      | none                                             |
//!
//! Allowed diff strategies are enforced at the flag-parsing boundary by the
//! [`DiffStrategy`] value enum, not here.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::filter::{FilterError, TargetFilter};

/// Errors from option assembly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("--diff-to-file requires a non-empty path")]
    EmptyDiffToFile,

    #[error("--name requires a non-empty environment name")]
    EmptyName,

    #[error("--max-stack must be greater than zero")]
    ZeroMaxStack,
}

/// Strategy used to compute differences against the cluster.
///
/// Absent means "detect automatically".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiffStrategy {
    /// Server-side diff (`kubectl diff`)
    Native,
    /// Client-side comparison of the fields present in the configuration
    Subset,
    /// Native diff preceded by a server-side dry-run validation
    Validate,
}

impl DiffStrategy {
    /// Name as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStrategy::Native => "native",
            DiffStrategy::Subset => "subset",
            DiffStrategy::Validate => "validate",
        }
    }
}

impl fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options forwarded to the configuration evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalOpts {
    /// External string variables
    pub ext_str: BTreeMap<String, String>,
    /// External code variables
    pub ext_code: BTreeMap<String, String>,
    /// Top-level string arguments
    pub tla_str: BTreeMap<String, String>,
    /// Top-level code arguments
    pub tla_code: BTreeMap<String, String>,
    /// Evaluator stack depth limit
    pub max_stack: Option<u32>,
}

/// Options shared by every workflow command.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// Compiled target selectors
    pub filters: TargetFilter,
    /// Resolved evaluation options
    pub eval: EvalOpts,
    /// Inline environment selector
    pub name: Option<String>,
}

/// Options for `apply`.
#[derive(Debug, Clone)]
pub struct ApplyOpts {
    pub opts: Opts,
    pub force: bool,
    pub validate: bool,
    pub auto_approve: bool,
    pub diff_to_file: Option<PathBuf>,
}

/// Options for `delete`.
#[derive(Debug, Clone)]
pub struct DeleteOpts {
    pub opts: Opts,
    pub force: bool,
    pub validate: bool,
    pub auto_approve: bool,
    pub diff_to_file: Option<PathBuf>,
}

/// Options for `prune`.
#[derive(Debug, Clone, Default)]
pub struct PruneOpts {
    pub opts: Opts,
    pub force: bool,
    pub auto_approve: bool,
    pub diff_to_file: Option<PathBuf>,
}

/// Options for `diff`.
#[derive(Debug, Clone, Default)]
pub struct DiffOpts {
    pub opts: Opts,
    pub strategy: Option<DiffStrategy>,
    pub summarize: bool,
    pub with_prune: bool,
    pub exit_zero: bool,
    pub diff_to_file: Option<PathBuf>,
}

impl Default for ApplyOpts {
    fn default() -> Self {
        Self {
            opts: Opts::default(),
            force: false,
            validate: true,
            auto_approve: false,
            diff_to_file: None,
        }
    }
}

impl Default for DeleteOpts {
    fn default() -> Self {
        Self {
            opts: Opts::default(),
            force: false,
            validate: true,
            auto_approve: false,
            diff_to_file: None,
        }
    }
}

/// Flags as parsed from the command line, before assembly.
///
/// Every command reads only the fields that apply to it.
#[derive(Debug, Clone)]
pub struct Flags {
    pub targets: Vec<String>,
    pub name: Option<String>,
    pub eval: EvalOpts,
    pub force: bool,
    pub validate: bool,
    pub auto_approve: bool,
    pub diff_to_file: Option<PathBuf>,
    pub strategy: Option<DiffStrategy>,
    pub summarize: bool,
    pub with_prune: bool,
    pub exit_zero: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            name: None,
            eval: EvalOpts::default(),
            force: false,
            validate: true,
            auto_approve: false,
            diff_to_file: None,
            strategy: None,
            summarize: false,
            with_prune: false,
            exit_zero: false,
        }
    }
}

impl Flags {
    /// Assemble the options shared by every command.
    pub fn opts(&self) -> Result<Opts, OptionsError> {
        let filters = TargetFilter::compile(&self.targets)?;

        if matches!(self.name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(OptionsError::EmptyName);
        }
        if self.eval.max_stack == Some(0) {
            return Err(OptionsError::ZeroMaxStack);
        }

        Ok(Opts {
            filters,
            eval: self.eval.clone(),
            name: self.name.clone(),
        })
    }

    /// Assemble options for `apply`.
    pub fn apply_opts(&self) -> Result<ApplyOpts, OptionsError> {
        Ok(ApplyOpts {
            opts: self.opts()?,
            force: self.force,
            validate: self.validate,
            auto_approve: self.auto_approve,
            diff_to_file: self.diff_to_file()?,
        })
    }

    /// Assemble options for `delete`.
    pub fn delete_opts(&self) -> Result<DeleteOpts, OptionsError> {
        Ok(DeleteOpts {
            opts: self.opts()?,
            force: self.force,
            validate: self.validate,
            auto_approve: self.auto_approve,
            diff_to_file: self.diff_to_file()?,
        })
    }

    /// Assemble options for `prune`.
    pub fn prune_opts(&self) -> Result<PruneOpts, OptionsError> {
        Ok(PruneOpts {
            opts: self.opts()?,
            force: self.force,
            auto_approve: self.auto_approve,
            diff_to_file: self.diff_to_file()?,
        })
    }

    /// Assemble options for `diff`.
    pub fn diff_opts(&self) -> Result<DiffOpts, OptionsError> {
        Ok(DiffOpts {
            opts: self.opts()?,
            strategy: self.strategy,
            summarize: self.summarize,
            with_prune: self.with_prune,
            exit_zero: self.exit_zero,
            diff_to_file: self.diff_to_file()?,
        })
    }

    fn diff_to_file(&self) -> Result<Option<PathBuf>, OptionsError> {
        match &self.diff_to_file {
            Some(path) if path.as_os_str().is_empty() => Err(OptionsError::EmptyDiffToFile),
            other => Ok(other.clone()),
        }
    }
}

//! engine::workflow
//!
//! The operations command handlers invoke.
//!
//! Handlers hold a `&mut dyn Workflow`, so they can be exercised against a
//! scripted implementation without an evaluator or a cluster.

use std::io;
use std::path::Path;

use thiserror::Error;

use super::diff_file::DiffFileError;
use super::gate::GateError;
use crate::cluster::ClusterError;
use crate::core::options::{ApplyOpts, DeleteOpts, DiffOpts, Opts, PruneOpts};
use crate::eval::EvalError;

/// Errors from workflow operations.
///
/// Collaborator errors pass through unchanged.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    DiffFile(#[from] DiffFileError),

    #[error("rendering manifests: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("displaying output: {0}")]
    Display(#[from] io::Error),

    #[error(
        "spec.injectLabels is not set for environment '{env}'. Labels are \
         required to detect resources removed from the configuration"
    )]
    LabelsRequired { env: String },
}

/// Evaluate-and-execute operations, one per command.
pub trait Workflow {
    /// Show the pending changes, ask for approval and apply.
    fn apply(&mut self, path: &Path, opts: &ApplyOpts) -> Result<(), WorkflowError>;

    /// Show what will be removed, ask for approval and delete every
    /// selected resource.
    fn delete(&mut self, path: &Path, opts: &DeleteOpts) -> Result<(), WorkflowError>;

    /// Delete live resources of the environment that are no longer
    /// configured.
    fn prune(&mut self, path: &Path, opts: &PruneOpts) -> Result<(), WorkflowError>;

    /// Differences between configuration and cluster; `None` when in sync.
    fn diff(&mut self, path: &Path, opts: &DiffOpts) -> Result<Option<String>, WorkflowError>;

    /// Rendered manifests as a YAML stream.
    fn show(&mut self, path: &Path, opts: &Opts) -> Result<String, WorkflowError>;
}

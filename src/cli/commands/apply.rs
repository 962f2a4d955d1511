//! apply command - Apply the configuration to the cluster
//!
//! Target selectors are compiled before anything is evaluated, so a
//! malformed selector fails the command before any cluster call.

use std::path::Path;

use anyhow::Result;

use crate::core::options::Flags;
use crate::engine::{ExitStatus, Workflow};

/// Apply the environment at `path`.
pub fn apply(workflow: &mut dyn Workflow, path: &Path, flags: &Flags) -> Result<ExitStatus> {
    let opts = flags.apply_opts()?;
    workflow.apply(path, &opts)?;
    Ok(ExitStatus::Clean)
}

//! delete command - Delete the environment's resources from the cluster

use std::path::Path;

use anyhow::Result;

use crate::core::options::Flags;
use crate::engine::{ExitStatus, Workflow};

/// Delete the resources of the environment at `path`.
pub fn delete(workflow: &mut dyn Workflow, path: &Path, flags: &Flags) -> Result<ExitStatus> {
    let opts = flags.delete_opts()?;
    workflow.delete(path, &opts)?;
    Ok(ExitStatus::Clean)
}

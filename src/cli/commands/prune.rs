//! prune command - Delete resources removed from the configuration

use std::path::Path;

use anyhow::Result;

use crate::core::options::Flags;
use crate::engine::{ExitStatus, Workflow};

/// Prune the environment at `path`.
pub fn prune(workflow: &mut dyn Workflow, path: &Path, flags: &Flags) -> Result<ExitStatus> {
    let opts = flags.prune_opts()?;
    workflow.prune(path, &opts)?;
    Ok(ExitStatus::Clean)
}

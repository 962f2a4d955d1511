//! diff command - Show differences between configuration and cluster
//!
//! # Ordering
//!
//! 1. Compute the diff
//! 2. Write `--diff-to-file`, if given (a write failure fails the command)
//! 3. Display the diff and decide the exit status
//!
//! The file is written before the exit status is decided, so it always
//! reflects the result the exit status reports.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::options::Flags;
use crate::engine::{interpret_diff, write_diff_to_file, ExitStatus, Workflow};
use crate::ui::console::Console;

/// Diff the environment at `path`.
pub fn diff(
    workflow: &mut dyn Workflow,
    console: &mut dyn Console,
    path: &Path,
    flags: &Flags,
) -> Result<ExitStatus> {
    let opts = flags.diff_opts()?;
    let result = workflow.diff(path, &opts)?;

    if let Some(file) = &opts.diff_to_file {
        write_diff_to_file(file, result.as_deref())?;
    }

    interpret_diff(result.as_deref(), opts.exit_zero, console).context("displaying diff")
}

//! show command - Print the rendered manifests
//!
//! Refuses to write into a pipe or file unless `--dangerous-allow-redirect`
//! was given. The refusal exits 0.

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::core::options::Flags;
use crate::engine::gate::REDIRECT_REFUSAL;
use crate::engine::{redirect_guard, Context, ExitStatus, RedirectDecision, Workflow};
use crate::ui::console::Console;

/// Show the manifests of the environment at `path`.
pub fn show(
    ctx: &Context,
    workflow: &mut dyn Workflow,
    console: &mut dyn Console,
    path: &Path,
    flags: &Flags,
    allow_redirect: bool,
) -> Result<ExitStatus> {
    if redirect_guard(ctx.terminal, allow_redirect) == RedirectDecision::Refuse {
        console.notice(REDIRECT_REFUSAL);
        return Ok(ExitStatus::Clean);
    }
    if !ctx.terminal {
        debug!("stdout is redirected, writing anyway");
    }

    let opts = flags.opts()?;
    let yaml = workflow.show(path, &opts)?;
    console.page(&yaml).context("writing manifests")?;
    Ok(ExitStatus::Clean)
}

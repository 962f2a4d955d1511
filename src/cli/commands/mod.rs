//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each workflow command handler:
//! 1. Assembles its options from the parsed flags (compiling target
//!    selectors first)
//! 2. Calls the [`Workflow`]
//! 3. Turns the result into an [`ExitStatus`]
//!
//! Handlers never talk to the evaluator or the cluster directly.

mod apply;
mod completion;
mod delete;
mod diff;
mod prune;
mod show;

pub use apply::apply;
pub use completion::completion;
pub use delete::delete;
pub use diff::diff;
pub use prune::prune;
pub use show::show;

use anyhow::Result;

use crate::cli::args::Command;
use crate::cluster::Kubectl;
use crate::core::config::Config;
use crate::core::options::Flags;
use crate::engine::{Context, ExitStatus, Pipeline, Workflow};
use crate::eval::JsonnetEvaluator;
use crate::ui::console::{Console, StdConsole};
use crate::ui::term;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context, config: &Config) -> Result<ExitStatus> {
    let pager = term::resolve_pager(|var| std::env::var(var).ok(), config.pager());
    let mut console = StdConsole::new(ctx.verbosity(), ctx.interactive, ctx.terminal, pager);
    let mut pipeline = Pipeline::new(
        JsonnetEvaluator::new(config.jsonnet_command(), config.jsonnet_jpath()),
        Kubectl::new(config.kubectl_command()),
        console.clone(),
    )
    .with_default_strategy(config.diff_strategy());

    run_workflow(command, ctx, &mut pipeline, &mut console)
}

/// Run a workflow command against the given workflow and console.
pub fn run_workflow(
    command: Command,
    ctx: &Context,
    workflow: &mut dyn Workflow,
    console: &mut dyn Console,
) -> Result<ExitStatus> {
    match command {
        Command::Apply {
            env,
            force,
            validate,
            auto_approve,
            diff_to_file,
        } => {
            let flags = Flags {
                force,
                validate,
                auto_approve,
                diff_to_file,
                ..env.flags()
            };
            apply(workflow, &env.path, &flags)
        }
        Command::Prune {
            env,
            force,
            auto_approve,
            diff_to_file,
        } => {
            let flags = Flags {
                force,
                auto_approve,
                diff_to_file,
                ..env.flags()
            };
            prune(workflow, &env.path, &flags)
        }
        Command::Delete {
            env,
            force,
            validate,
            auto_approve,
            diff_to_file,
        } => {
            let flags = Flags {
                force,
                validate,
                auto_approve,
                diff_to_file,
                ..env.flags()
            };
            delete(workflow, &env.path, &flags)
        }
        Command::Diff {
            env,
            strategy,
            summarize,
            with_prune,
            exit_zero,
            diff_to_file,
        } => {
            let flags = Flags {
                strategy,
                summarize,
                with_prune,
                exit_zero,
                diff_to_file,
                ..env.flags()
            };
            diff(workflow, console, &env.path, &flags)
        }
        Command::Show {
            env,
            allow_redirect,
        } => show(ctx, workflow, console, &env.path, &env.flags(), allow_redirect),
        Command::Completion { shell } => {
            completion(shell, &mut std::io::stdout())?;
            Ok(ExitStatus::Clean)
        }
    }
}

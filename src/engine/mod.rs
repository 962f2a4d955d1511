//! engine
//!
//! The workflow layer: drives evaluation and the cluster for each command
//! and enforces the guarantees callers rely on.
//!
//! # Architecture
//!
//! ```text
//! flags -> Option Assembler -> command handler -> Workflow -> outcome -> exit status
//!                                                    |
//!                                         Evaluator + Cluster + Console
//! ```
//!
//! - [`terminal`] - Terminal detection, probed once per process
//! - [`gate`] - Mutation approval and the output redirection guard
//! - [`outcome`] - Diff result to exit status
//! - [`diff_file`] - Persisting diffs to a file
//! - [`workflow`] - The interface command handlers call
//! - [`pipeline`] - The evaluator/cluster implementation of that interface
//!
//! # Invariants
//!
//! - Nothing is mutated without approval: either `--dangerous-auto-approve`
//!   or an operator typing `yes` at an interactive prompt
//! - A requested diff file always exists after a successful run, empty when
//!   there are no differences
//! - Diff exit statuses distinguish clean, changes found and failure

pub mod diff_file;
pub mod gate;
pub mod outcome;
pub mod pipeline;
pub mod terminal;
pub mod workflow;

pub use diff_file::{write_diff_to_file, DiffFileError};
pub use gate::{redirect_guard, require_approval, GateError, RedirectDecision};
pub use outcome::{interpret_diff, ExitStatus};
pub use pipeline::Pipeline;
pub use terminal::{FixedTerminal, StdTerminal, Terminal};
pub use workflow::{Workflow, WorkflowError};

use crate::ui::output::Verbosity;

/// Per-process execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Stdout is attached to a terminal.
    pub terminal: bool,
    /// Interactive prompts are permitted.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            debug: false,
            quiet: false,
            terminal: true,
            interactive: true,
        }
    }
}

impl Context {
    /// Build the context, probing the terminal exactly once.
    ///
    /// Prompts are permitted only when both stdin and stdout are terminals
    /// and neither `--quiet`, `--no-interactive` nor the configuration
    /// disabled them.
    pub fn probe(
        terminal: &dyn Terminal,
        debug: bool,
        quiet: bool,
        no_interactive: bool,
        config_interactive: bool,
    ) -> Self {
        let stdout = terminal.stdout_is_terminal();
        let stdin = terminal.stdin_is_terminal();
        Self {
            debug,
            quiet,
            terminal: stdout,
            interactive: stdout && stdin && !quiet && !no_interactive && config_interactive,
        }
    }

    /// Output verbosity derived from the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

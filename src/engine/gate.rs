//! engine::gate
//!
//! Safety checks run before a command produces output or mutates anything.
//!
//! Both checks are safety nets for operators, not security boundaries.
//!
//! # Mutation approval
//!
//! `apply`, `delete` and `prune` proceed without a prompt only when
//! `--dangerous-auto-approve` was given. Approval is never inferred from
//! other flags. Without it the operator must type `yes`; when no prompt can
//! be shown the mutation is refused.
//!
//! # Redirection guard
//!
//! `show` refuses to write manifests into a pipe or file unless
//! `--dangerous-allow-redirect` was given. Refusing is not an error.

use thiserror::Error;
use tracing::debug;

use crate::ui::console::Console;
use crate::ui::prompts::PromptError;

/// Prompt shown before mutations.
pub const CONFIRM_PROMPT: &str = "Please type 'yes' to confirm";

/// Message printed when `show` refuses to write to a redirected stdout.
pub const REDIRECT_REFUSAL: &str = "\
Redirection of the output of tk show is discouraged and disabled by default.
Run tk show --dangerous-allow-redirect to bypass this check.";

/// Errors from the approval gate.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("aborted by user")]
    Aborted,

    #[error(
        "refusing to {action} without approval: no interactive terminal \
         (pass --dangerous-auto-approve to skip the prompt)"
    )]
    ApprovalRequired { action: String },

    #[error("reading approval failed: {0}")]
    Prompt(PromptError),
}

/// Outcome of the redirection guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDecision {
    Allow,
    Refuse,
}

/// Decide whether `show` may write to stdout.
pub fn redirect_guard(terminal: bool, allow_redirect: bool) -> RedirectDecision {
    if terminal || allow_redirect {
        RedirectDecision::Allow
    } else {
        RedirectDecision::Refuse
    }
}

/// Require approval before a mutation.
///
/// `explanation` tells the operator what is about to happen and where.
pub fn require_approval(
    auto_approve: bool,
    action: &str,
    explanation: &str,
    console: &mut dyn Console,
) -> Result<(), GateError> {
    if auto_approve {
        debug!(action, "approval skipped by --dangerous-auto-approve");
        return Ok(());
    }

    console.notice(explanation);
    match console.confirm(CONFIRM_PROMPT) {
        Ok(true) => Ok(()),
        Ok(false) | Err(PromptError::Cancelled) => Err(GateError::Aborted),
        Err(PromptError::NotInteractive) => Err(GateError::ApprovalRequired {
            action: action.to_string(),
        }),
        Err(e) => Err(GateError::Prompt(e)),
    }
}

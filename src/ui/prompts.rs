//! ui::prompts
//!
//! Interactive confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode the
//! prompt fails with [`PromptError::NotInteractive`] so that callers never
//! proceed with a mutation nobody approved.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Ask the operator to type `yes`.
///
/// Returns `Ok(true)` only for an exact (trimmed) `yes`; anything else is a
/// decline. End of input counts as cancellation.
pub fn confirm_yes(message: &str, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stderr = io::stderr();
    read_confirmation(message, &mut input, &mut stderr)
}

/// Prompt on `output` and read the answer from `input`.
pub fn read_confirmation(
    message: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<bool, PromptError> {
    write!(output, "{}: ", message).map_err(|e| PromptError::IoError(e.to_string()))?;
    output
        .flush()
        .map_err(|e| PromptError::IoError(e.to_string()))?;

    let mut answer = String::new();
    let read = input
        .read_line(&mut answer)
        .map_err(|e| PromptError::IoError(e.to_string()))?;
    if read == 0 {
        return Err(PromptError::Cancelled);
    }

    Ok(answer.trim() == "yes")
}

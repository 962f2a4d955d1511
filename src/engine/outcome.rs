//! engine::outcome
//!
//! Maps a diff result onto the process exit status.
//!
//! | result            | `--exit-zero` | status          |
//! |-------------------|---------------|-----------------|
//! | no differences    | any           | `Clean` (0)     |
//! | differences       | unset         | `ChangesFound` (16) |
//! | differences       | set           | `Clean` (0)     |
//!
//! A failed diff never reaches this module; the error propagates and the
//! process exits 1.

use std::io;
use std::process::ExitCode;

use crate::ui::console::Console;

/// Message shown when the cluster already matches the configuration.
pub const NO_DIFFERENCES: &str = "No differences.";

/// Exit status of a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Success, or nothing to do.
    Clean,
    /// `diff` found differences.
    ChangesFound,
}

impl ExitStatus {
    /// Numeric process exit code.
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::ChangesFound => 16,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Display a diff result and decide the exit status.
///
/// Only a failure to display the diff is an error here.
pub fn interpret_diff(
    result: Option<&str>,
    exit_zero: bool,
    console: &mut dyn Console,
) -> io::Result<ExitStatus> {
    let Some(diff) = result else {
        console.notice(NO_DIFFERENCES);
        return Ok(ExitStatus::Clean);
    };

    console.diff(diff)?;
    if exit_zero {
        Ok(ExitStatus::Clean)
    } else {
        Ok(ExitStatus::ChangesFound)
    }
}

//! engine::terminal
//!
//! Terminal detection, probed once per process.

use std::io::{self, IsTerminal};

/// Reports whether the process is attached to a terminal.
pub trait Terminal {
    /// True when stdout is attached to an interactive terminal.
    fn stdout_is_terminal(&self) -> bool;

    /// True when stdin is attached to an interactive terminal.
    fn stdin_is_terminal(&self) -> bool;
}

/// The real process streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTerminal;

impl Terminal for StdTerminal {
    fn stdout_is_terminal(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn stdin_is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }
}

/// A terminal with fixed answers, for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTerminal {
    pub stdout: bool,
    pub stdin: bool,
}

impl FixedTerminal {
    /// Both streams attached to a terminal.
    pub fn attached() -> Self {
        Self {
            stdout: true,
            stdin: true,
        }
    }

    /// Both streams redirected.
    pub fn detached() -> Self {
        Self::default()
    }
}

impl Terminal for FixedTerminal {
    fn stdout_is_terminal(&self) -> bool {
        self.stdout
    }

    fn stdin_is_terminal(&self) -> bool {
        self.stdin
    }
}

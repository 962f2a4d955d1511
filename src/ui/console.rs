//! ui::console
//!
//! The display capability handed to the workflow layer.
//!
//! # Design
//!
//! The engine never writes to the process streams directly. It talks to a
//! [`Console`], which the binary backs with the real terminal
//! ([`StdConsole`]) and tests back with an in-memory recorder
//! ([`RecordingConsole`]).

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::output::{self, Verbosity};
use super::prompts::{self, PromptError};
use super::term;

/// Operator-facing input and output.
pub trait Console {
    /// Informational diagnostic (suppressed in quiet mode).
    fn info(&mut self, message: &str);

    /// Warning diagnostic (suppressed in quiet mode).
    fn warn(&mut self, message: &str);

    /// Diagnostic that is always shown.
    fn notice(&mut self, message: &str);

    /// Display rendered output, paging it when interactive.
    fn page(&mut self, text: &str) -> io::Result<()>;

    /// Display a diff, colorizing it when interactive.
    fn diff(&mut self, text: &str) -> io::Result<()> {
        self.page(text)
    }

    /// Ask the operator to type `yes`.
    fn confirm(&mut self, message: &str) -> Result<bool, PromptError>;
}

/// Console backed by stdout, stderr and stdin.
#[derive(Debug, Clone)]
pub struct StdConsole {
    verbosity: Verbosity,
    interactive: bool,
    terminal: bool,
    pager: Option<Vec<String>>,
}

impl StdConsole {
    /// Create a console.
    ///
    /// `terminal` reports whether stdout is attached to a terminal and
    /// controls colors and paging; `interactive` controls prompts.
    pub fn new(
        verbosity: Verbosity,
        interactive: bool,
        terminal: bool,
        pager: Option<Vec<String>>,
    ) -> Self {
        Self {
            verbosity,
            interactive,
            terminal,
            pager,
        }
    }
}

impl Console for StdConsole {
    fn info(&mut self, message: &str) {
        output::info(message, self.verbosity);
    }

    fn warn(&mut self, message: &str) {
        output::warn(message, self.verbosity);
    }

    fn notice(&mut self, message: &str) {
        output::notice(message);
    }

    fn page(&mut self, text: &str) -> io::Result<()> {
        let pager = if self.terminal {
            self.pager.as_deref()
        } else {
            None
        };
        term::page(text, pager)
    }

    fn diff(&mut self, text: &str) -> io::Result<()> {
        if self.terminal {
            let colored = term::colordiff(text);
            self.page(&colored)
        } else {
            self.page(text)
        }
    }

    fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        prompts::confirm_yes(message, self.interactive)
    }
}

/// An event captured by [`RecordingConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Info(String),
    Warn(String),
    Notice(String),
    Page(String),
    Diff(String),
    Confirm(String),
}

/// In-memory console for tests.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct RecordingConsole {
    inner: Arc<Mutex<RecordingInner>>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    events: Vec<ConsoleEvent>,
    answers: Vec<bool>,
    interactive: bool,
}

impl RecordingConsole {
    /// A console that refuses prompts, like a non-interactive session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A console that answers prompts from `answers`, in order.
    ///
    /// Once the answers run out further prompts are cancelled.
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        let console = Self::default();
        {
            let mut inner = console.lock();
            inner.interactive = true;
            inner.answers = answers.into_iter().collect();
            inner.answers.reverse();
        }
        console
    }

    /// Every event recorded so far.
    pub fn events(&self) -> Vec<ConsoleEvent> {
        self.lock().events.clone()
    }

    /// Diagnostics (info, warn and notice) in order.
    pub fn diagnostics(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Info(m) | ConsoleEvent::Warn(m) | ConsoleEvent::Notice(m) => {
                    Some(m.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Everything that would have reached stdout.
    pub fn stdout(&self) -> String {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Page(t) | ConsoleEvent::Diff(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of prompts shown.
    pub fn prompts(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| matches!(e, ConsoleEvent::Confirm(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, RecordingInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, event: ConsoleEvent) {
        self.lock().events.push(event);
    }
}

impl Console for RecordingConsole {
    fn info(&mut self, message: &str) {
        self.record(ConsoleEvent::Info(message.to_string()));
    }

    fn warn(&mut self, message: &str) {
        self.record(ConsoleEvent::Warn(message.to_string()));
    }

    fn notice(&mut self, message: &str) {
        self.record(ConsoleEvent::Notice(message.to_string()));
    }

    fn page(&mut self, text: &str) -> io::Result<()> {
        self.record(ConsoleEvent::Page(text.to_string()));
        Ok(())
    }

    fn diff(&mut self, text: &str) -> io::Result<()> {
        self.record(ConsoleEvent::Diff(text.to_string()));
        Ok(())
    }

    fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        let mut inner = self.lock();
        if !inner.interactive {
            return Err(PromptError::NotInteractive);
        }
        inner.events.push(ConsoleEvent::Confirm(message.to_string()));
        inner.answers.pop().ok_or(PromptError::Cancelled)
    }
}

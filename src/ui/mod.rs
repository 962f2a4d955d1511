//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`console`] - The display capability injected into the engine
//! - [`output`] - Diagnostic message formatting
//! - [`prompts`] - Interactive confirmations
//! - [`term`] - Colorized diffs, diff summaries and paging
//!
//! # Design
//!
//! All output and prompts go through this module so that interactive and
//! non-interactive sessions are handled in one place.

pub mod console;
pub mod output;
pub mod prompts;
pub mod term;

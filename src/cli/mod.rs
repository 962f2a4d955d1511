//! cli
//!
//! Command-line interface layer for tk.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging and load configuration
//! - Probe the terminal once and delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`], which owns every safety check.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::engine::{self, ExitStatus, StdTerminal};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "TK_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<ExitStatus> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let config = Config::load()?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }

    let ctx = engine::Context::probe(
        &StdTerminal,
        cli.debug,
        cli.quiet,
        cli.no_interactive,
        config.interactive(),
    );
    colored::control::set_override(ctx.terminal);

    commands::dispatch(cli.command, &ctx, &config)
}

/// Install the stderr log subscriber.
///
/// `TK_LOG` wins over `--debug`; without either only warnings are logged.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

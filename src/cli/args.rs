//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Never prompt
//! - `--quiet` / `-q`: Minimal output
//!
//! # Shared Flags
//!
//! Every workflow command takes the environment path plus [`EnvArgs`]:
//! target selectors, the inline environment name and evaluation options.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::core::options::{DiffStrategy, EvalOpts, Flags};

/// tk - apply, diff and prune rendered Kubernetes environments
#[derive(Parser, Debug)]
#[command(name = "tk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Environment selection and evaluation flags shared by workflow commands.
#[derive(Args, Debug, Clone)]
pub struct EnvArgs {
    /// Environment directory or entrypoint file
    pub path: PathBuf,

    /// Regular expression matching '<kind>/<name>' of resources to operate
    /// on; repeat to select more
    #[arg(short = 't', long = "target", value_name = "KIND/NAME")]
    pub targets: Vec<String>,

    /// Inline environment to use when the path defines several
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub eval: EvalArgs,
}

/// Options forwarded to the configuration evaluator.
#[derive(Args, Debug, Clone, Default)]
pub struct EvalArgs {
    /// Set an external string variable
    #[arg(long = "ext-str", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub ext_str: Vec<(String, String)>,

    /// Set an external code variable
    #[arg(long = "ext-code", value_name = "KEY=CODE", value_parser = parse_key_val)]
    pub ext_code: Vec<(String, String)>,

    /// Set a top-level string argument
    #[arg(long = "tla-str", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub tla_str: Vec<(String, String)>,

    /// Set a top-level code argument
    #[arg(long = "tla-code", value_name = "KEY=CODE", value_parser = parse_key_val)]
    pub tla_code: Vec<(String, String)>,

    /// Evaluator stack depth limit
    #[arg(long, value_name = "N")]
    pub max_stack: Option<u32>,
}

impl EvalArgs {
    /// Collect into evaluator options. Later values win for repeated keys.
    pub fn to_opts(&self) -> EvalOpts {
        EvalOpts {
            ext_str: self.ext_str.iter().cloned().collect(),
            ext_code: self.ext_code.iter().cloned().collect(),
            tla_str: self.tla_str.iter().cloned().collect(),
            tla_code: self.tla_code.iter().cloned().collect(),
            max_stack: self.max_stack,
        }
    }
}

impl EnvArgs {
    /// Flags shared by every command, with command-specific fields left at
    /// their defaults.
    pub fn flags(&self) -> Flags {
        Flags {
            targets: self.targets.clone(),
            name: self.name.clone(),
            eval: self.eval.to_opts(),
            ..Flags::default()
        }
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the configuration to the cluster
    #[command(
        long_about = "Apply the configuration to the cluster.\n\n\
            Shows the differences between the configuration and the cluster, \
            then asks you to type 'yes' before applying. Without an interactive \
            terminal the apply is refused unless --dangerous-auto-approve is given.",
        after_help = "\
EXAMPLES:
    # Review and apply an environment
    tk apply environments/prod

    # Apply only the grafana deployment, keeping a copy of the diff
    tk apply environments/prod -t deployment/grafana --diff-to-file apply.diff"
    )]
    Apply {
        #[command(flatten)]
        env: EnvArgs,

        /// Force the apply (kubectl apply --force)
        #[arg(long)]
        force: bool,

        /// Validate resources against the cluster schema
        #[arg(
            long,
            default_value_t = true,
            action = ArgAction::Set,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true",
            value_name = "BOOL"
        )]
        validate: bool,

        /// Skip the interactive approval
        #[arg(long = "dangerous-auto-approve")]
        auto_approve: bool,

        /// Write the diff to this file before asking for approval
        #[arg(long, value_name = "PATH")]
        diff_to_file: Option<PathBuf>,
    },

    /// Delete resources of the environment that were removed from the
    /// configuration
    #[command(
        long_about = "Delete resources of the environment that were removed from the \
            configuration.\n\n\
            Requires spec.injectLabels, which marks every applied resource with \
            the environment it belongs to."
    )]
    Prune {
        #[command(flatten)]
        env: EnvArgs,

        /// Force the deletion (kubectl delete --force)
        #[arg(long)]
        force: bool,

        /// Skip the interactive approval
        #[arg(long = "dangerous-auto-approve")]
        auto_approve: bool,

        /// Write the diff to this file before asking for approval
        #[arg(long, value_name = "PATH")]
        diff_to_file: Option<PathBuf>,
    },

    /// Delete the environment's resources from the cluster
    Delete {
        #[command(flatten)]
        env: EnvArgs,

        /// Force the deletion (kubectl delete --force)
        #[arg(long)]
        force: bool,

        /// Run a server-side dry-run before deleting
        #[arg(
            long,
            default_value_t = true,
            action = ArgAction::Set,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true",
            value_name = "BOOL"
        )]
        validate: bool,

        /// Skip the interactive approval
        #[arg(long = "dangerous-auto-approve")]
        auto_approve: bool,

        /// Write the diff to this file before asking for approval
        #[arg(long, value_name = "PATH")]
        diff_to_file: Option<PathBuf>,
    },

    /// Show the differences between the configuration and the cluster
    #[command(
        long_about = "Show the differences between the configuration and the cluster.\n\n\
            Exits with status 16 when differences were found, 0 when there are \
            none and 1 on error.",
        after_help = "\
EXAMPLES:
    # Fail a CI step when the cluster drifted
    tk diff environments/prod

    # Only report, never fail on differences
    tk diff environments/prod --exit-zero --diff-to-file drift.diff"
    )]
    Diff {
        #[command(flatten)]
        env: EnvArgs,

        /// Strategy used to compute the diff
        #[arg(long = "diff-strategy", value_enum)]
        strategy: Option<DiffStrategy>,

        /// Print a summary instead of the full diff
        #[arg(short, long)]
        summarize: bool,

        /// Include resources that would be pruned
        #[arg(short = 'p', long)]
        with_prune: bool,

        /// Exit with 0 even when differences were found
        #[arg(short = 'z', long)]
        exit_zero: bool,

        /// Also write the diff to this file
        #[arg(long, value_name = "PATH")]
        diff_to_file: Option<PathBuf>,
    },

    /// Print the rendered manifests as YAML
    Show {
        #[command(flatten)]
        env: EnvArgs,

        /// Print even when stdout is not a terminal
        #[arg(long = "dangerous-allow-redirect")]
        allow_redirect: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

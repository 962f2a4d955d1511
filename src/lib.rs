//! tankflow - workflow commands for rendered Kubernetes environments
//!
//! Provides the `tk` binary: evaluates an environment's configuration and
//! applies, deletes, prunes, diffs or shows the resulting resources.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Safety gates, exit statuses, diff files and the workflow
//! - [`core`] - Target filters, option assembly, manifests and configuration
//! - [`eval`] - Configuration evaluator and environment loading
//! - [`cluster`] - Cluster executor and diff engine
//! - [`ui`] - Operator-facing output, prompts, colors and paging
//!
//! # Correctness Invariants
//!
//! 1. Nothing is mutated without explicit approval
//! 2. A requested diff file always exists after the command, empty when there
//!    are no differences
//! 3. `diff` exits 0 when clean, 16 when differences were found and 1 on
//!    error

pub mod cli;
pub mod cluster;
pub mod core;
pub mod engine;
pub mod eval;
pub mod ui;

//! core
//!
//! Core domain types, option assembly and configuration for tk.
//!
//! # Modules
//!
//! - [`filter`] - Target selectors matched against `<kind>/<name>`
//! - [`options`] - Per-command options and the assembler building them
//! - [`manifest`] - Resource manifests: extraction, labelling and ordering
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Nothing here performs network I/O
//! - Invalid input is rejected when values are built, not when used
//! - Schemas are strict and self-describing

pub mod config;
pub mod filter;
pub mod manifest;
pub mod options;

//! cluster
//!
//! The cluster executor and diff engine.
//!
//! # Modules
//!
//! - [`kubectl`] - Implementation that shells out to `kubectl`
//! - [`mock`] - In-memory implementation for deterministic tests
//!
//! # Design
//!
//! The workflow layer only ever talks to the [`Cluster`] trait. Errors are
//! reported verbatim; nothing at this level or above retries.

pub mod kubectl;
pub mod mock;

pub use kubectl::Kubectl;
pub use mock::MockCluster;

use thiserror::Error;

use crate::core::manifest::Manifest;
use crate::core::options::DiffStrategy;

/// Errors from cluster operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    /// The client executable could not be started.
    #[error("failed to run '{command}': {message}")]
    Spawn { command: String, message: String },

    /// The client ran and reported a failure.
    #[error("'{command}' failed ({status}):\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The client produced output that could not be understood.
    #[error("unexpected output from '{command}': {message}")]
    InvalidOutput { command: String, message: String },

    /// The requested diff strategy cannot be used with this cluster.
    #[error("diff strategy '{0}' is not supported by this cluster client")]
    UnsupportedStrategy(DiffStrategy),
}

/// Where operations are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Target {
    /// Client context to use; the client default when absent
    pub context: Option<String>,
    /// Default namespace for resources without one
    pub namespace: String,
}

/// Flags forwarded to mutating calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationFlags {
    pub force: bool,
    pub validate: bool,
}

/// Operations the workflow layer needs from a cluster.
pub trait Cluster {
    /// Create or update resources.
    fn apply(
        &self,
        target: &Target,
        manifests: &[Manifest],
        flags: MutationFlags,
    ) -> Result<(), ClusterError>;

    /// Delete resources. Resources that are already gone are not an error.
    fn delete(
        &self,
        target: &Target,
        manifests: &[Manifest],
        flags: MutationFlags,
    ) -> Result<(), ClusterError>;

    /// Compute the textual diff between the resources and the live state.
    ///
    /// `Ok(None)` means there are no differences.
    fn diff(
        &self,
        target: &Target,
        manifests: &[Manifest],
        strategy: DiffStrategy,
    ) -> Result<Option<String>, ClusterError>;

    /// List live resources carrying `label=value`, across all namespaces.
    fn list_labeled(
        &self,
        target: &Target,
        label: &str,
        value: &str,
    ) -> Result<Vec<Manifest>, ClusterError>;
}

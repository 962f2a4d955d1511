//! cluster::mock
//!
//! Mock cluster implementation for deterministic testing.
//!
//! # Design
//!
//! The mock cluster returns a configured diff, serves a configured set of
//! live resources and records every call so tests can assert what reached
//! the cluster, and in which order.
//!
//! # Example
//!
//! ```
//! use tankflow::cluster::mock::MockCluster;
//! use tankflow::cluster::{Cluster, Target};
//! use tankflow::core::options::DiffStrategy;
//!
//! let cluster = MockCluster::new().with_diff("-a\n+b\n");
//! let diff = cluster.diff(&Target::default(), &[], DiffStrategy::Native).unwrap();
//! assert_eq!(diff.as_deref(), Some("-a\n+b\n"));
//! assert!(!cluster.mutated());
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use super::{Cluster, ClusterError, MutationFlags, Target};
use crate::core::manifest::Manifest;
use crate::core::options::DiffStrategy;

/// Mock cluster for testing.
///
/// Clones share state via an internal `Arc<Mutex<...>>`.
#[derive(Debug, Clone, Default)]
pub struct MockCluster {
    inner: Arc<Mutex<MockClusterInner>>,
}

#[derive(Debug, Default)]
struct MockClusterInner {
    /// Diff returned by `diff`.
    diff: Option<String>,
    /// Live resources served by `list_labeled`.
    live: Vec<Manifest>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Apply(ClusterError),
    Delete(ClusterError),
    Diff(ClusterError),
    ListLabeled(ClusterError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Apply {
        resources: Vec<String>,
        flags: MutationFlags,
    },
    Delete {
        resources: Vec<String>,
        flags: MutationFlags,
    },
    Diff {
        resources: Vec<String>,
        strategy: DiffStrategy,
    },
    ListLabeled {
        label: String,
        value: String,
    },
}

impl MockCluster {
    /// A cluster with no differences and no live resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `diff` from every diff call.
    pub fn with_diff(self, diff: impl Into<String>) -> Self {
        self.lock().diff = Some(diff.into());
        self
    }

    /// Serve `live` from `list_labeled`.
    pub fn with_live(self, live: Vec<Manifest>) -> Self {
        self.lock().live = live;
        self
    }

    /// Fail the given operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Operations recorded so far.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// True if any apply or delete reached the cluster.
    pub fn mutated(&self) -> bool {
        self.lock().operations.iter().any(|op| {
            matches!(
                op,
                MockOperation::Apply { .. } | MockOperation::Delete { .. }
            )
        })
    }

    fn lock(&self) -> MutexGuard<'_, MockClusterInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn names(manifests: &[Manifest]) -> Vec<String> {
    manifests.iter().map(Manifest::kind_name).collect()
}

impl Cluster for MockCluster {
    fn apply(
        &self,
        _target: &Target,
        manifests: &[Manifest],
        flags: MutationFlags,
    ) -> Result<(), ClusterError> {
        let mut inner = self.lock();
        if let Some(FailOn::Apply(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner.operations.push(MockOperation::Apply {
            resources: names(manifests),
            flags,
        });
        Ok(())
    }

    fn delete(
        &self,
        _target: &Target,
        manifests: &[Manifest],
        flags: MutationFlags,
    ) -> Result<(), ClusterError> {
        let mut inner = self.lock();
        if let Some(FailOn::Delete(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner.operations.push(MockOperation::Delete {
            resources: names(manifests),
            flags,
        });
        Ok(())
    }

    fn diff(
        &self,
        _target: &Target,
        manifests: &[Manifest],
        strategy: DiffStrategy,
    ) -> Result<Option<String>, ClusterError> {
        let mut inner = self.lock();
        if let Some(FailOn::Diff(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner.operations.push(MockOperation::Diff {
            resources: names(manifests),
            strategy,
        });
        Ok(inner.diff.clone())
    }

    fn list_labeled(
        &self,
        _target: &Target,
        label: &str,
        value: &str,
    ) -> Result<Vec<Manifest>, ClusterError> {
        let mut inner = self.lock();
        if let Some(FailOn::ListLabeled(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner.operations.push(MockOperation::ListLabeled {
            label: label.to_string(),
            value: value.to_string(),
        });
        Ok(inner
            .live
            .iter()
            .filter(|m| m.label(label) == Some(value))
            .cloned()
            .collect())
    }
}

//! engine::pipeline
//!
//! [`Workflow`] implementation combining an [`Evaluator`], a [`Cluster`]
//! and a [`Console`].
//!
//! # Flow
//!
//! Every mutating command follows the same order:
//!
//! 1. Evaluate the environment and select resources
//! 2. Compute the diff of what will change
//! 3. Write the diff file, if requested
//! 4. Display the diff
//! 5. Ask for approval
//! 6. Mutate
//!
//! A failure at any step stops the command before the next one runs, so
//! nothing is mutated after an error.
//!
//! # Diff strategy
//!
//! `--diff-strategy` wins over the environment's `spec.diffStrategy`, which
//! wins over the configured default. Without any of them the native strategy
//! is used. `apply` has no flag and follows the rest of the chain, so it shows
//! the same diff as `diff`.

use std::path::Path;

use tracing::{debug, info};

use super::diff_file::write_diff_to_file;
use super::gate::require_approval;
use super::workflow::{Workflow, WorkflowError};
use crate::cluster::{Cluster, MutationFlags, Target};
use crate::core::filter::TargetFilter;
use crate::core::manifest::{self, Manifest, ENVIRONMENT_LABEL};
use crate::core::options::{ApplyOpts, DeleteOpts, DiffOpts, DiffStrategy, Opts, PruneOpts};
use crate::eval::{load_environment, Environment, Evaluator};
use crate::ui::console::Console;
use crate::ui::term;

/// Warning shown by `apply` when the cluster already matches.
pub const APPLY_NO_CHANGES: &str =
    "There are no differences. Your apply may not do anything at all.";

/// Notice shown by `prune` when there are no orphaned resources.
pub const NOTHING_TO_PRUNE: &str = "Nothing found to prune.";

/// Notice shown by `delete` when no resource is selected.
pub const NOTHING_TO_DELETE: &str = "Nothing found to delete.";

/// Evaluator, cluster and console wired together.
pub struct Pipeline<E, C, U> {
    evaluator: E,
    cluster: C,
    console: U,
    default_strategy: Option<DiffStrategy>,
}

impl<E: Evaluator, C: Cluster, U: Console> Pipeline<E, C, U> {
    pub fn new(evaluator: E, cluster: C, console: U) -> Self {
        Self {
            evaluator,
            cluster,
            console,
            default_strategy: None,
        }
    }

    /// Strategy used when neither the flag nor the environment sets one.
    pub fn with_default_strategy(mut self, strategy: Option<DiffStrategy>) -> Self {
        self.default_strategy = strategy;
        self
    }

    fn load(&self, path: &Path, opts: &Opts) -> Result<Environment, WorkflowError> {
        let env = load_environment(&self.evaluator, path, opts)?;
        if !opts.filters.is_empty() {
            debug!(
                targets = ?opts.filters.sources(),
                selected = env.manifests.len(),
                "applied target selectors"
            );
        }
        Ok(env)
    }

    fn strategy(&self, flag: Option<DiffStrategy>, env: &Environment) -> DiffStrategy {
        flag.or(env.diff_strategy)
            .or(self.default_strategy)
            .unwrap_or(DiffStrategy::Native)
    }

    /// Live resources of the environment missing from its configuration.
    fn orphans(
        &self,
        env: &Environment,
        filters: &TargetFilter,
    ) -> Result<Vec<Manifest>, WorkflowError> {
        let live = self
            .cluster
            .list_labeled(&target(env), ENVIRONMENT_LABEL, &env.label())?;
        let mut orphans: Vec<Manifest> = live
            .into_iter()
            .filter(|l| filters.matches(l.kind(), l.name()))
            .filter(|l| !env.manifests.iter().any(|m| same_resource(m, l)))
            .collect();
        manifest::sort(&mut orphans);
        debug!(env = %env.name, orphans = orphans.len(), "computed orphaned resources");
        Ok(orphans)
    }

    /// Write the diff file, display the diff and ask for approval.
    fn review(
        &mut self,
        action: &str,
        env: &Environment,
        diff: Option<&str>,
        diff_to_file: Option<&Path>,
        auto_approve: bool,
    ) -> Result<(), WorkflowError> {
        if let Some(path) = diff_to_file {
            write_diff_to_file(path, diff)?;
        }
        if let Some(diff) = diff {
            self.console.diff(diff)?;
        }
        require_approval(auto_approve, action, &explain(action, env), &mut self.console)?;
        Ok(())
    }
}

impl<E: Evaluator, C: Cluster, U: Console> Workflow for Pipeline<E, C, U> {
    fn apply(&mut self, path: &Path, opts: &ApplyOpts) -> Result<(), WorkflowError> {
        let env = self.load(path, &opts.opts)?;
        let target = target(&env);

        let strategy = self.strategy(None, &env);
        let diff = self.cluster.diff(&target, &env.manifests, strategy)?;
        if diff.is_none() {
            self.console.warn(APPLY_NO_CHANGES);
        }
        self.review(
            "apply",
            &env,
            diff.as_deref(),
            opts.diff_to_file.as_deref(),
            opts.auto_approve,
        )?;

        info!(env = %env.name, resources = env.manifests.len(), "applying");
        let flags = MutationFlags {
            force: opts.force,
            validate: opts.validate,
        };
        self.cluster.apply(&target, &env.manifests, flags)?;
        Ok(())
    }

    fn delete(&mut self, path: &Path, opts: &DeleteOpts) -> Result<(), WorkflowError> {
        let env = self.load(path, &opts.opts)?;
        let diff = deletion_diff(&env.manifests)?;
        if diff.is_none() {
            if let Some(path) = opts.diff_to_file.as_deref() {
                write_diff_to_file(path, None)?;
            }
            self.console.notice(NOTHING_TO_DELETE);
            return Ok(());
        }

        self.review(
            "delete",
            &env,
            diff.as_deref(),
            opts.diff_to_file.as_deref(),
            opts.auto_approve,
        )?;

        info!(env = %env.name, resources = env.manifests.len(), "deleting");
        let flags = MutationFlags {
            force: opts.force,
            validate: opts.validate,
        };
        self.cluster.delete(&target(&env), &env.manifests, flags)?;
        Ok(())
    }

    fn prune(&mut self, path: &Path, opts: &PruneOpts) -> Result<(), WorkflowError> {
        let env = self.load(path, &opts.opts)?;
        if !env.inject_labels {
            return Err(WorkflowError::LabelsRequired { env: env.name });
        }

        let orphans = self.orphans(&env, &opts.opts.filters)?;
        let diff = deletion_diff(&orphans)?;
        if diff.is_none() {
            if let Some(path) = opts.diff_to_file.as_deref() {
                write_diff_to_file(path, None)?;
            }
            self.console.notice(NOTHING_TO_PRUNE);
            return Ok(());
        }

        self.review(
            "prune",
            &env,
            diff.as_deref(),
            opts.diff_to_file.as_deref(),
            opts.auto_approve,
        )?;

        info!(env = %env.name, resources = orphans.len(), "pruning");
        let flags = MutationFlags {
            force: opts.force,
            validate: false,
        };
        self.cluster.delete(&target(&env), &orphans, flags)?;
        Ok(())
    }

    fn diff(&mut self, path: &Path, opts: &DiffOpts) -> Result<Option<String>, WorkflowError> {
        let env = self.load(path, &opts.opts)?;
        let strategy = self.strategy(opts.strategy, &env);
        debug!(env = %env.name, %strategy, "computing diff");

        let mut diff = self.cluster.diff(&target(&env), &env.manifests, strategy)?;

        if opts.with_prune {
            if env.inject_labels {
                let orphans = self.orphans(&env, &opts.opts.filters)?;
                if let Some(pruned) = deletion_diff(&orphans)? {
                    diff = Some(diff.unwrap_or_default() + &pruned);
                }
            } else {
                self.console.warn(
                    "--with-prune has no effect: spec.injectLabels is not set for this environment",
                );
            }
        }

        if opts.summarize {
            diff = diff.map(|d| term::summarize(&d));
        }
        Ok(diff)
    }

    fn show(&mut self, path: &Path, opts: &Opts) -> Result<String, WorkflowError> {
        let env = self.load(path, opts)?;
        Ok(manifest::to_yaml_stream(&env.manifests)?)
    }
}

fn target(env: &Environment) -> Target {
    Target {
        context: env.context.clone(),
        namespace: env.namespace.clone(),
    }
}

/// Live resources are matched without their API group, which may differ
/// from the configured one. Cluster-scoped live resources carry no
/// namespace, while configured ones had the default namespace injected.
fn same_resource(configured: &Manifest, live: &Manifest) -> bool {
    configured.kind() == live.kind()
        && configured.name() == live.name()
        && live
            .namespace()
            .map_or(true, |ns| configured.namespace() == Some(ns))
}

fn explain(action: &str, env: &Environment) -> String {
    let verb = match action {
        "apply" => "Applying to",
        "delete" => "Deleting from",
        _ => "Pruning from",
    };
    let mut out = format!("{} namespace '{}'", verb, env.namespace);
    if let Some(server) = &env.api_server {
        out.push_str(&format!(" of cluster at '{}'", server));
    }
    if let Some(context) = &env.context {
        out.push_str(&format!(" using context '{}'", context));
    }
    out.push('.');
    out
}

/// Render the removal of `manifests` as a unified diff.
///
/// Returns `None` when there is nothing to remove.
pub fn deletion_diff(manifests: &[Manifest]) -> Result<Option<String>, serde_yaml::Error> {
    if manifests.is_empty() {
        return Ok(None);
    }

    let mut out = String::new();
    for m in manifests {
        let yaml = m.to_yaml()?;
        let lines: Vec<&str> = yaml.lines().collect();
        out.push_str(&format!("--- live/{}\n", diff_id(m)));
        out.push_str("+++ /dev/null\n");
        out.push_str(&format!("@@ -1,{} +0,0 @@\n", lines.len()));
        for line in lines {
            out.push('-');
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(Some(out))
}

/// `<group>.<version>.<Kind>[.<namespace>].<name>`, as `kubectl diff` names
/// its temporary files.
fn diff_id(m: &Manifest) -> String {
    let mut parts = vec![m.api_version().replace('/', "."), m.kind().to_string()];
    if let Some(ns) = m.namespace() {
        parts.push(ns.to_string());
    }
    parts.push(m.name().to_string());
    parts.join(".")
}

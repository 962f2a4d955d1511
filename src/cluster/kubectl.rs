//! cluster::kubectl
//!
//! [`Cluster`] implementation that shells out to `kubectl`.
//!
//! Resources are passed on stdin as a single `v1/List` document. The
//! client's own progress output for mutations goes straight to the
//! operator's stdout; stderr is captured and reported on failure.
//!
//! # Diff strategies
//!
//! - `native`: `kubectl diff`, where exit status 1 means "differences found"
//! - `validate`: server-side dry-run apply, then the native diff
//! - `subset`: not available through `kubectl`

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

use serde_json::{json, Value};
use tracing::debug;

use super::{Cluster, ClusterError, MutationFlags, Target};
use crate::core::manifest::Manifest;
use crate::core::options::DiffStrategy;

/// Resource types never considered for pruning.
const UNPRUNABLE: &[&str] = &["events", "events.events.k8s.io"];

/// Cluster client backed by the `kubectl` executable.
#[derive(Debug, Clone)]
pub struct Kubectl {
    command: String,
}

impl Kubectl {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn command(&self, target: &Target, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.command);
        if let Some(context) = &target.context {
            cmd.arg("--context").arg(context);
        }
        cmd.args(args);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.command, args.join(" "))
    }

    /// Run with `input` on stdin, capturing stdout unless `inherit_stdout`.
    fn run(
        &self,
        target: &Target,
        args: &[&str],
        input: Option<&str>,
        inherit_stdout: bool,
    ) -> Result<Output, ClusterError> {
        let description = self.describe(args);
        debug!(command = %description, "running cluster client");

        let mut cmd = self.command(target, args);
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(if inherit_stdout {
            Stdio::inherit()
        } else {
            Stdio::piped()
        })
        .stderr(Stdio::piped());

        let spawn_error = |e: std::io::Error| ClusterError::Spawn {
            command: description.clone(),
            message: e.to_string(),
        };
        let mut child = cmd.spawn().map_err(spawn_error)?;
        let stdin = child.stdin.take();

        // Feed stdin while stdout and stderr are drained, so neither side
        // blocks on a full pipe.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match (input, stdin) {
                (Some(input), Some(mut stdin)) => stdin.write_all(input.as_bytes()),
                _ => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(spawn_error)?;
        match written {
            // The client exited without reading everything; its status says why.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(command = %description, "cluster client closed stdin early");
            }
            Err(e) => return Err(spawn_error(e)),
            Ok(()) => {}
        }
        Ok(output)
    }

    fn run_checked(
        &self,
        target: &Target,
        args: &[&str],
        input: Option<&str>,
        inherit_stdout: bool,
    ) -> Result<Output, ClusterError> {
        let output = self.run(target, args, input, inherit_stdout)?;
        if !output.status.success() {
            return Err(self.failure(args, &output));
        }
        Ok(output)
    }

    fn failure(&self, args: &[&str], output: &Output) -> ClusterError {
        ClusterError::CommandFailed {
            command: self.describe(args),
            status: describe_status(output.status),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        }
    }

    fn native_diff(
        &self,
        target: &Target,
        input: &str,
    ) -> Result<Option<String>, ClusterError> {
        let args = ["diff", "-f", "-"];
        let output = self.run(target, &args, Some(input), false)?;
        match output.status.code() {
            Some(0) => Ok(None),
            Some(1) => Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned())),
            _ => Err(self.failure(&args, &output)),
        }
    }

    fn listable_resources(&self, target: &Target) -> Result<Vec<String>, ClusterError> {
        let args = ["api-resources", "--verbs=list", "-o", "name"];
        let output = self.run_checked(target, &args, None, false)?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !UNPRUNABLE.contains(l))
            .map(str::to_string)
            .collect())
    }
}

impl Cluster for Kubectl {
    fn apply(
        &self,
        target: &Target,
        manifests: &[Manifest],
        flags: MutationFlags,
    ) -> Result<(), ClusterError> {
        let mut args = vec!["apply", "-f", "-"];
        if flags.force {
            args.push("--force");
        }
        if !flags.validate {
            args.push("--validate=false");
        }
        self.run_checked(target, &args, Some(&list_document(manifests)), true)?;
        Ok(())
    }

    fn delete(
        &self,
        target: &Target,
        manifests: &[Manifest],
        flags: MutationFlags,
    ) -> Result<(), ClusterError> {
        let input = list_document(manifests);
        if flags.validate {
            let args = ["delete", "-f", "-", "--ignore-not-found", "--dry-run=server"];
            self.run_checked(target, &args, Some(&input), false)?;
        }

        let mut args = vec!["delete", "-f", "-", "--ignore-not-found"];
        if flags.force {
            args.push("--force");
        }
        self.run_checked(target, &args, Some(&input), true)?;
        Ok(())
    }

    fn diff(
        &self,
        target: &Target,
        manifests: &[Manifest],
        strategy: DiffStrategy,
    ) -> Result<Option<String>, ClusterError> {
        let input = list_document(manifests);
        match strategy {
            DiffStrategy::Native => self.native_diff(target, &input),
            DiffStrategy::Validate => {
                let args = ["apply", "-f", "-", "--dry-run=server"];
                self.run_checked(target, &args, Some(&input), false)?;
                self.native_diff(target, &input)
            }
            DiffStrategy::Subset => Err(ClusterError::UnsupportedStrategy(strategy)),
        }
    }

    fn list_labeled(
        &self,
        target: &Target,
        label: &str,
        value: &str,
    ) -> Result<Vec<Manifest>, ClusterError> {
        let resources = self.listable_resources(target)?;
        if resources.is_empty() {
            return Ok(Vec::new());
        }

        let kinds = resources.join(",");
        let selector = format!("{}={}", label, value);
        let args = [
            "get",
            kinds.as_str(),
            "--all-namespaces",
            "-l",
            selector.as_str(),
            "-o",
            "json",
        ];
        let output = self.run_checked(target, &args, None, false)?;
        parse_list(&output.stdout).map_err(|message| ClusterError::InvalidOutput {
            command: self.describe(&args[..1]),
            message,
        })
    }
}

/// Serialize resources as one `v1/List` document.
pub fn list_document(manifests: &[Manifest]) -> String {
    json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": manifests,
    })
    .to_string()
}

/// Parse `kubectl get -o json` output, dropping duplicates served by
/// several API groups.
pub fn parse_list(stdout: &[u8]) -> Result<Vec<Manifest>, String> {
    let value: Value = serde_json::from_slice(stdout).map_err(|e| e.to_string())?;
    let items = value
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing items array".to_string())?;

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let Value::Object(object) = item else {
            return Err(format!("item {} is not an object", i));
        };
        let manifest =
            Manifest::from_object(object.clone(), &format!(".items[{}]", i)).map_err(|e| e.to_string())?;
        let key = (
            manifest.kind().to_string(),
            manifest.namespace().map(str::to_string),
            manifest.name().to_string(),
        );
        if seen.insert(key) {
            out.push(manifest);
        }
    }
    Ok(out)
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

//! Integration tests for the `tk` binary.
//!
//! Every command runs with an isolated home directory and configuration.
//! Under the test harness stdout is a pipe, never a terminal.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `tk` command isolated from the user's configuration.
fn tk(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tk").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("xdg"))
        .env("TK_CONFIG", home.join("no-such-config.toml"))
        .env_remove("TK_LOG")
        .env_remove("TK_PAGER")
        .env_remove("PAGER");
    cmd
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    tk(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tk"));
}

#[test]
fn help_lists_workflow_commands() {
    let home = TempDir::new().unwrap();
    tk(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("apply")
                .and(predicate::str::contains("prune"))
                .and(predicate::str::contains("diff"))
                .and(predicate::str::contains("show")),
        );
}

#[test]
fn show_refuses_piped_output() {
    let home = TempDir::new().unwrap();
    tk(home.path())
        .args(["show", "environments/prod"])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Redirection of the output of tk show is discouraged",
        ));
}

#[test]
fn malformed_target_fails() {
    let home = TempDir::new().unwrap();
    tk(home.path())
        .args([
            "apply",
            "environments/prod",
            "--dangerous-auto-approve",
            "-t",
            "[invalid",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("error: invalid target selector '[invalid'"));
}

#[test]
fn unknown_diff_strategy_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    tk(home.path())
        .args(["diff", "environments/prod", "--diff-strategy", "magic"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("magic"));
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.toml");
    std::fs::write(&config, "unknown_key = true\n").unwrap();

    tk(home.path())
        .env("TK_CONFIG", &config)
        .args(["diff", "environments/prod"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn completion_script() {
    let home = TempDir::new().unwrap();
    tk(home.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_tk"));
}

/// End-to-end runs against stand-in `jsonnet` and `kubectl` executables.
#[cfg(unix)]
mod end_to_end {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    const DIFF: &str = "\
--- /tmp/LIVE-1/apps.v1.Deployment.default.grafana
+++ /tmp/MERGED-1/apps.v1.Deployment.default.grafana
@@ -6,7 +6,7 @@
-  replicas: 1
+  replicas: 2
";

    const RESOURCES: &str = r#"{
        "grafana": {
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "grafana" }
        }
    }"#;

    /// A temporary workspace with an environment, stand-in tools and a
    /// configuration pointing at them.
    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path();
            fs::create_dir_all(root.join("env")).unwrap();
            fs::create_dir_all(root.join("bin")).unwrap();
            fs::write(root.join("env/main.jsonnet"), "{}").unwrap();
            fs::write(root.join("output.json"), RESOURCES).unwrap();

            script(
                &root.join("bin/jsonnet"),
                &format!(
                    "echo \"$*\" >> '{log}'\ncat '{out}'\n",
                    log = root.join("jsonnet.log").display(),
                    out = root.join("output.json").display(),
                ),
            );
            script(
                &root.join("bin/kubectl"),
                &format!(
                    "echo \"$*\" >> '{log}'\ncat > /dev/null\n\
                     if [ \"$1\" = diff ] && [ -f '{diff}' ]; then cat '{diff}'; exit 1; fi\n\
                     exit 0\n",
                    log = root.join("kubectl.log").display(),
                    diff = root.join("diff.txt").display(),
                ),
            );
            fs::write(
                root.join("config.toml"),
                format!(
                    "[jsonnet]\ncommand = \"{}\"\n\n[kubectl]\ncommand = \"{}\"\n",
                    root.join("bin/jsonnet").display(),
                    root.join("bin/kubectl").display(),
                ),
            )
            .unwrap();

            Self { dir }
        }

        fn with_diff(self) -> Self {
            fs::write(self.dir.path().join("diff.txt"), DIFF).unwrap();
            self
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn tk(&self) -> Command {
            let mut cmd = tk(self.dir.path());
            cmd.env("TK_CONFIG", self.path("config.toml"));
            cmd.arg("--no-interactive");
            cmd
        }

        fn log(&self, tool: &str) -> String {
            fs::read_to_string(self.path(&format!("{}.log", tool))).unwrap_or_default()
        }
    }

    fn script(path: &Path, body: &str) {
        fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn diff_to_file_with_changes_exits_16() {
        let f = Fixture::new().with_diff();
        let out = f.path("out.diff");

        f.tk()
            .arg("diff")
            .arg(f.path("env"))
            .arg("--diff-to-file")
            .arg(&out)
            .assert()
            .code(16)
            .stdout(DIFF);

        assert_eq!(fs::read_to_string(&out).unwrap(), DIFF);
        assert!(f.log("kubectl").starts_with("diff -f -"));
    }

    #[test]
    fn exit_zero_without_changes() {
        let f = Fixture::new();

        f.tk()
            .arg("diff")
            .arg(f.path("env"))
            .arg("--exit-zero")
            .assert()
            .code(0)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("No differences."));

        assert!(!f.path("out.diff").exists());
    }

    #[test]
    fn summarize_prints_stats() {
        let f = Fixture::new().with_diff();

        f.tk()
            .arg("diff")
            .arg(f.path("env"))
            .arg("-s")
            .assert()
            .code(16)
            .stdout(predicate::str::contains(
                "1 resource changed, 1 insertion(+), 1 deletion(-)",
            ));
    }

    #[test]
    fn show_with_allowed_redirect() {
        let f = Fixture::new();

        f.tk()
            .arg("show")
            .arg(f.path("env"))
            .arg("--dangerous-allow-redirect")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("kind: Deployment")
                    .and(predicate::str::contains("namespace: default")),
            );
        assert!(f.log("kubectl").is_empty());
    }

    #[test]
    fn apply_without_approval_is_refused() {
        let f = Fixture::new().with_diff();

        f.tk()
            .arg("apply")
            .arg(f.path("env"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--dangerous-auto-approve"));

        assert!(!f.log("kubectl").lines().any(|l| l.starts_with("apply")));
    }

    #[test]
    fn apply_with_auto_approve() {
        let f = Fixture::new().with_diff();

        f.tk()
            .arg("apply")
            .arg(f.path("env"))
            .arg("--dangerous-auto-approve")
            .arg("--validate=false")
            .assert()
            .success();

        let log = f.log("kubectl");
        assert!(log.lines().any(|l| l == "apply -f - --validate=false"));
    }

    #[test]
    fn evaluation_flags_reach_the_evaluator() {
        let f = Fixture::new();

        f.tk()
            .arg("diff")
            .arg(f.path("env"))
            .args(["--ext-str", "cluster=prod", "--max-stack", "500"])
            .assert()
            .code(0);

        let log = f.log("jsonnet");
        assert!(log.contains("--ext-str cluster=prod"));
        assert!(log.contains("--max-stack 500"));
    }
}

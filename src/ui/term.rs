//! ui::term
//!
//! Terminal rendering: colorized diffs, diff summaries and paging.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use colored::Colorize;
use tracing::{debug, warn};

/// Pager used when nothing else is configured.
pub const DEFAULT_PAGER: &str = "less --RAW-CONTROL-CHARS --quit-if-one-screen --no-init";

/// Colorize a unified diff line by line.
///
/// Whether escape codes are emitted follows `colored::control`, which the
/// binary sets from the terminal probe.
pub fn colordiff(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len() + diff.len() / 4);
    for line in diff.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        out.push_str(&paint(body));
        out.push_str(newline);
    }
    out
}

fn paint(line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else if line.starts_with("+++") || line.starts_with("---") || line.starts_with("diff ") {
        line.bold().to_string()
    } else if line.starts_with('+') {
        line.green().to_string()
    } else if line.starts_with('-') {
        line.red().to_string()
    } else if line.starts_with("@@") {
        line.cyan().to_string()
    } else {
        line.to_string()
    }
}

/// Per-resource change counts in a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub insertions: usize,
    pub deletions: usize,
}

/// Count insertions and deletions per resource.
pub fn diffstat(diff: &str) -> Vec<FileStat> {
    let mut stats: Vec<FileStat> = Vec::new();
    for line in diff.lines() {
        if let Some(rest) = line.strip_prefix("diff ") {
            let name = rest.split_whitespace().last().unwrap_or(rest);
            stats.push(FileStat {
                name: resource_name(name),
                insertions: 0,
                deletions: 0,
            });
        } else if let Some(rest) = line.strip_prefix("--- ") {
            let starts_new = stats
                .last()
                .map_or(true, |s| s.insertions > 0 || s.deletions > 0);
            if starts_new {
                let name = rest.split('\t').next().unwrap_or(rest);
                stats.push(FileStat {
                    name: resource_name(name),
                    insertions: 0,
                    deletions: 0,
                });
            }
        } else if line.starts_with("+++ ") {
            continue;
        } else if let Some(stat) = stats.last_mut() {
            if line.starts_with('+') {
                stat.insertions += 1;
            } else if line.starts_with('-') {
                stat.deletions += 1;
            }
        }
    }
    stats
}

/// Render a diffstat summary in place of the full diff.
pub fn summarize(diff: &str) -> String {
    let stats = diffstat(diff);
    let width = stats.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for stat in &stats {
        out.push_str(&format!(
            " {:width$} | +{} -{}\n",
            stat.name,
            stat.insertions,
            stat.deletions,
            width = width
        ));
    }
    let insertions: usize = stats.iter().map(|s| s.insertions).sum();
    let deletions: usize = stats.iter().map(|s| s.deletions).sum();
    out.push_str(&format!(
        " {} resource{} changed, {} insertion{}(+), {} deletion{}(-)\n",
        stats.len(),
        plural(stats.len()),
        insertions,
        plural(insertions),
        deletions,
        plural(deletions)
    ));
    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn resource_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Resolve the pager command line.
///
/// `TK_PAGER` wins over `PAGER`, which wins over the configured pager. A
/// variable that is set but empty disables paging.
pub fn resolve_pager(
    env: impl Fn(&str) -> Option<String>,
    configured: Option<&str>,
) -> Option<Vec<String>> {
    for var in ["TK_PAGER", "PAGER"] {
        if let Some(value) = env(var) {
            return split_command(&value);
        }
    }
    split_command(configured.unwrap_or(DEFAULT_PAGER))
}

fn split_command(value: &str) -> Option<Vec<String>> {
    if value.trim().is_empty() {
        return None;
    }
    match shell_words::split(value) {
        Ok(parts) if !parts.is_empty() => Some(parts),
        Ok(_) => None,
        Err(e) => {
            warn!(pager = value, error = %e, "ignoring unparsable pager command");
            None
        }
    }
}

/// Write text through the pager, or straight to stdout without one.
///
/// A pager that cannot be started falls back to stdout. A pager that exits
/// before reading everything (the operator quit early) is not an error.
pub fn page(text: &str, pager: Option<&[String]>) -> io::Result<()> {
    let Some((program, args)) = pager.and_then(|p| p.split_first()) else {
        return write_stdout(text);
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!(pager = %program, error = %e, "pager unavailable, writing to stdout");
            return write_stdout(text);
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(text.as_bytes()) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
        }
    }
    child.wait()?;
    Ok(())
}

fn write_stdout(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.is_empty() && !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "\
diff -u -N /tmp/LIVE-1/apps.v1.Deployment.default.grafana /tmp/MERGED-1/apps.v1.Deployment.default.grafana
--- /tmp/LIVE-1/apps.v1.Deployment.default.grafana\t2024-01-01
+++ /tmp/MERGED-1/apps.v1.Deployment.default.grafana\t2024-01-01
@@ -1,3 +1,3 @@
 spec:
-  replicas: 1
+  replicas: 2
+  paused: false
diff -u -N /tmp/LIVE-1/v1.Service.default.grafana /tmp/MERGED-1/v1.Service.default.grafana
--- /tmp/LIVE-1/v1.Service.default.grafana\t2024-01-01
+++ /tmp/MERGED-1/v1.Service.default.grafana\t2024-01-01
@@ -1,2 +1,1 @@
-  port: 80
";

    #[test]
    fn colordiff_colors_lines() {
        colored::control::set_override(true);
        let out = colordiff("--- a\n-old\n+new\n@@ -1 +1 @@\n same\n");
        assert!(out.contains(&"--- a".bold().to_string()));
        assert!(out.contains(&"-old".red().to_string()));
        assert!(out.contains(&"+new".green().to_string()));
        assert!(out.contains(&"@@ -1 +1 @@".cyan().to_string()));
        assert!(out.contains("\x1b[31m-old"));
        assert!(out.contains("\n same\n"));
    }

    #[test]
    fn colordiff_keeps_missing_trailing_newline() {
        let out = colordiff("+x");
        assert!(!out.ends_with('\n'));
        assert_eq!(colordiff(""), "");
    }

    #[test]
    fn diffstat_counts_per_resource() {
        let stats = diffstat(DIFF);
        assert_eq!(
            stats,
            vec![
                FileStat {
                    name: "apps.v1.Deployment.default.grafana".to_string(),
                    insertions: 2,
                    deletions: 1,
                },
                FileStat {
                    name: "v1.Service.default.grafana".to_string(),
                    insertions: 0,
                    deletions: 1,
                },
            ]
        );
    }

    #[test]
    fn diffstat_without_diff_lines() {
        let stats = diffstat("--- live/Service/default/a\n+++ /dev/null\n-a\n-b\n");
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "a");
        assert_eq!(stats[0].deletions, 2);
    }

    #[test]
    fn summarize_totals() {
        let out = summarize(DIFF);
        assert!(out.contains("apps.v1.Deployment.default.grafana | +2 -1"));
        assert!(out.ends_with(" 2 resources changed, 2 insertions(+), 2 deletions(-)\n"));
    }

    #[test]
    fn pager_precedence() {
        let env = |k: &str| match k {
            "TK_PAGER" => Some("bat --plain".to_string()),
            "PAGER" => Some("more".to_string()),
            _ => None,
        };
        assert_eq!(
            resolve_pager(env, Some("less")),
            Some(vec!["bat".to_string(), "--plain".to_string()])
        );

        let env = |k: &str| (k == "PAGER").then(|| "more".to_string());
        assert_eq!(resolve_pager(env, None), Some(vec!["more".to_string()]));

        assert_eq!(
            resolve_pager(|_| None, Some("most -s")),
            Some(vec!["most".to_string(), "-s".to_string()])
        );
        assert_eq!(resolve_pager(|_| None, None).unwrap()[0], "less");
    }

    #[test]
    fn empty_pager_disables_paging() {
        let env = |k: &str| (k == "TK_PAGER").then(String::new);
        assert_eq!(resolve_pager(env, Some("less")), None);
    }
}

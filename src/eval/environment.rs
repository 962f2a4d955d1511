//! eval::environment
//!
//! Environment metadata and the resources selected for an operation.
//!
//! # Static and inline environments
//!
//! A static environment is a directory with an optional `spec.json`
//! describing it. Inline environments are objects in the evaluated output
//! with `apiVersion: tanka.dev/v1alpha1` and `kind: Environment`; their
//! resources live under `data`. When inline environments are present,
//! `--name` selects one of them; it is ignored for static environments.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{EvalError, Evaluator};
use crate::core::manifest::{self, Manifest};
use crate::core::options::{DiffStrategy, Opts};

/// Metadata file describing a static environment.
pub const SPEC_FILE: &str = "spec.json";

const DEFAULT_NAMESPACE: &str = "default";

/// An evaluated environment with its processed resources.
#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub namespace: String,
    pub api_server: Option<String>,
    /// Cluster client context to use, the first of `spec.contextNames`
    pub context: Option<String>,
    pub inject_labels: bool,
    pub diff_strategy: Option<DiffStrategy>,
    /// Resources after namespace defaulting, labelling, filtering and sorting
    pub manifests: Vec<Manifest>,
}

impl Environment {
    /// Value of the environment label for this environment.
    pub fn label(&self) -> String {
        manifest::environment_label(&self.name, &self.namespace)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvironmentDoc {
    metadata: EnvironmentMetadata,
    spec: EnvironmentSpec,
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvironmentMetadata {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EnvironmentSpec {
    api_server: Option<String>,
    namespace: Option<String>,
    context_names: Vec<String>,
    inject_labels: bool,
    diff_strategy: Option<DiffStrategy>,
}

/// Evaluate `path` and build the environment selected by `opts`.
pub fn load_environment(
    evaluator: &dyn Evaluator,
    path: &Path,
    opts: &Opts,
) -> Result<Environment, EvalError> {
    let output = evaluator.eval(path, &opts.eval)?;

    let mut inline = Vec::new();
    find_inline(&output, &mut inline);

    let (doc, raw) = if inline.is_empty() {
        if let Some(name) = &opts.name {
            debug!(name = %name, "--name ignored for a static environment");
        }
        let doc = read_spec(path)?;
        (doc, output)
    } else {
        let mut doc = select_inline(inline, opts.name.as_deref())?;
        let data = std::mem::take(&mut doc.data);
        (doc, data)
    };

    let name = doc
        .metadata
        .name
        .unwrap_or_else(|| default_name(path));
    let namespace = doc
        .spec
        .namespace
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let label = doc
        .spec
        .inject_labels
        .then(|| manifest::environment_label(&name, &namespace));
    let manifests = manifest::process(
        manifest::extract(&raw)?,
        &namespace,
        label.as_deref(),
        &opts.filters,
    );
    debug!(env = %name, resources = manifests.len(), "evaluated environment");

    Ok(Environment {
        name,
        namespace,
        api_server: doc.spec.api_server,
        context: doc.spec.context_names.into_iter().next(),
        inject_labels: doc.spec.inject_labels,
        diff_strategy: doc.spec.diff_strategy,
        manifests,
    })
}

fn find_inline<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(object) if manifest::is_environment(object) => out.push(value),
        Value::Object(object) if manifest::is_resource(object) => {}
        Value::Object(object) => object.values().for_each(|v| find_inline(v, out)),
        Value::Array(items) => items.iter().for_each(|v| find_inline(v, out)),
        _ => {}
    }
}

fn select_inline(inline: Vec<&Value>, name: Option<&str>) -> Result<EnvironmentDoc, EvalError> {
    let docs = inline
        .into_iter()
        .map(|v| {
            serde_json::from_value::<EnvironmentDoc>(v.clone())
                .map_err(|e| EvalError::InvalidInlineEnvironment(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let available = || {
        docs.iter()
            .map(|d| d.metadata.name.clone().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ")
    };

    match name {
        Some(name) => {
            let not_found = EvalError::EnvironmentNotFound {
                name: name.to_string(),
                available: available(),
            };
            docs.into_iter()
                .find(|d| d.metadata.name.as_deref() == Some(name))
                .ok_or(not_found)
        }
        None if docs.len() == 1 => Ok(docs.into_iter().next().unwrap_or_default()),
        None => Err(EvalError::AmbiguousEnvironment {
            available: available(),
        }),
    }
}

fn read_spec(path: &Path) -> Result<EnvironmentDoc, EvalError> {
    let dir = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    };
    let file = dir.join(SPEC_FILE);
    if !file.is_file() {
        return Ok(EnvironmentDoc::default());
    }

    let invalid = |message: String| EvalError::InvalidSpec {
        path: file.clone(),
        message,
    };
    let contents = fs::read_to_string(&file).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| invalid(e.to_string()))
}

fn default_name(path: &Path) -> String {
    let trimmed: PathBuf = path.components().collect();
    let name = trimmed.display().to_string();
    if name.is_empty() {
        ".".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::TargetFilter;
    use crate::core::manifest::ENVIRONMENT_LABEL;
    use crate::eval::StaticEvaluator;
    use serde_json::json;
    use tempfile::TempDir;

    fn resources() -> Value {
        json!({
            "grafana": {
                "deployment": { "apiVersion": "apps/v1", "kind": "Deployment", "metadata": { "name": "grafana" } },
                "service": { "apiVersion": "v1", "kind": "Service", "metadata": { "name": "grafana" } },
            }
        })
    }

    fn inline(name: &str, namespace: &str) -> Value {
        json!({
            "apiVersion": "tanka.dev/v1alpha1",
            "kind": "Environment",
            "metadata": { "name": name },
            "spec": { "namespace": namespace, "injectLabels": true },
            "data": resources(),
        })
    }

    #[test]
    fn static_environment_reads_spec() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(SPEC_FILE),
            r#"{
                "apiVersion": "tanka.dev/v1alpha1",
                "kind": "Environment",
                "metadata": { "name": "environments/prod" },
                "spec": {
                    "apiServer": "https://127.0.0.1:6443",
                    "namespace": "monitoring",
                    "contextNames": ["prod-ctx", "fallback"],
                    "injectLabels": true,
                    "diffStrategy": "validate"
                }
            }"#,
        )
        .unwrap();

        let evaluator = StaticEvaluator::new(resources());
        let env = load_environment(&evaluator, temp.path(), &Opts::default()).unwrap();

        assert_eq!(env.name, "environments/prod");
        assert_eq!(env.namespace, "monitoring");
        assert_eq!(env.context.as_deref(), Some("prod-ctx"));
        assert_eq!(env.api_server.as_deref(), Some("https://127.0.0.1:6443"));
        assert_eq!(env.diff_strategy, Some(DiffStrategy::Validate));
        assert_eq!(env.manifests.len(), 2);
        let label = env.label();
        assert!(env
            .manifests
            .iter()
            .all(|m| m.namespace() == Some("monitoring") && m.label(ENVIRONMENT_LABEL) == Some(label.as_str())));
    }

    #[test]
    fn static_environment_without_spec() {
        let temp = TempDir::new().unwrap();
        let evaluator = StaticEvaluator::new(resources());
        let opts = Opts {
            name: Some("ignored".to_string()),
            ..Opts::default()
        };
        let env = load_environment(&evaluator, temp.path(), &opts).unwrap();

        assert_eq!(env.name, temp.path().display().to_string());
        assert_eq!(env.namespace, "default");
        assert!(!env.inject_labels);
        assert!(env.manifests.iter().all(|m| m.label(ENVIRONMENT_LABEL).is_none()));
    }

    #[test]
    fn filters_are_applied() {
        let temp = TempDir::new().unwrap();
        let evaluator = StaticEvaluator::new(resources());
        let opts = Opts {
            filters: TargetFilter::compile(["deployment/.*"]).unwrap(),
            ..Opts::default()
        };
        let env = load_environment(&evaluator, temp.path(), &opts).unwrap();
        assert_eq!(env.manifests.len(), 1);
        assert_eq!(env.manifests[0].kind(), "Deployment");
    }

    #[test]
    fn single_inline_environment_selected_without_name() {
        let evaluator = StaticEvaluator::new(inline("dev", "dev-ns"));
        let env = load_environment(&evaluator, Path::new("envs.jsonnet"), &Opts::default()).unwrap();
        assert_eq!(env.name, "dev");
        assert_eq!(env.namespace, "dev-ns");
        assert_eq!(env.manifests.len(), 2);
        assert!(env.inject_labels);
    }

    #[test]
    fn inline_environment_selected_by_name() {
        let evaluator = StaticEvaluator::new(json!([inline("dev", "a"), inline("prod", "b")]));
        let opts = Opts {
            name: Some("prod".to_string()),
            ..Opts::default()
        };
        let env = load_environment(&evaluator, Path::new("envs.jsonnet"), &opts).unwrap();
        assert_eq!(env.name, "prod");
        assert_eq!(env.namespace, "b");
    }

    #[test]
    fn multiple_inline_environments_need_a_name() {
        let evaluator = StaticEvaluator::new(json!({ "a": inline("dev", "a"), "b": inline("prod", "b") }));
        let err = load_environment(&evaluator, Path::new("envs.jsonnet"), &Opts::default()).unwrap_err();
        assert!(matches!(err, EvalError::AmbiguousEnvironment { .. }));
    }

    #[test]
    fn unknown_inline_name() {
        let evaluator = StaticEvaluator::new(inline("dev", "a"));
        let opts = Opts {
            name: Some("staging".to_string()),
            ..Opts::default()
        };
        match load_environment(&evaluator, Path::new("envs.jsonnet"), &opts).unwrap_err() {
            EvalError::EnvironmentNotFound { name, available } => {
                assert_eq!(name, "staging");
                assert_eq!(available, "dev");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_spec_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SPEC_FILE), "{ not json").unwrap();
        let evaluator = StaticEvaluator::new(resources());
        assert!(matches!(
            load_environment(&evaluator, temp.path(), &Opts::default()),
            Err(EvalError::InvalidSpec { .. })
        ));
    }
}

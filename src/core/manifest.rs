//! core::manifest
//!
//! Rendered resource manifests and the processing applied to them between
//! evaluation and the cluster.
//!
//! # Extraction
//!
//! Evaluator output is an arbitrary JSON tree. Any object carrying string
//! `apiVersion` and `kind` fields is a manifest; `kind: List` objects expand
//! to their `items`. Other objects and arrays are walked recursively. A
//! primitive reached during the walk is an error, since it cannot be part of
//! a resource.
//!
//! # Processing
//!
//! 1. Default `metadata.namespace` to the environment namespace
//! 2. Optionally add the environment label
//! 3. Keep only the resources selected by the target filter
//! 4. Sort so that namespaces and definitions are created first

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::filter::TargetFilter;

/// Label marking resources as owned by an environment.
pub const ENVIRONMENT_LABEL: &str = "tanka.dev/environment";

/// `apiVersion` of inline environment objects.
pub const ENVIRONMENT_API_VERSION: &str = "tanka.dev/v1alpha1";

/// Kinds that must exist before anything else is created.
const KIND_ORDER: &[&str] = &[
    "Namespace",
    "CustomResourceDefinition",
    "ServiceAccount",
    "ClusterRole",
    "ClusterRoleBinding",
    "Role",
    "RoleBinding",
];

/// Errors from manifest extraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("found a {found} at '{path}' where a resource object was expected")]
    PrimitiveReached { path: String, found: &'static str },

    #[error("resource at '{path}' has no metadata.name")]
    MissingName { path: String },

    #[error("List at '{path}' has no items array")]
    InvalidList { path: String },
}

/// A single rendered resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Wrap an object, checking the fields every resource must carry.
    pub fn from_object(object: Map<String, Value>, path: &str) -> Result<Self, ManifestError> {
        let manifest = Self(object);
        if manifest.name().is_empty() {
            return Err(ManifestError::MissingName {
                path: path.to_string(),
            });
        }
        Ok(manifest)
    }

    pub fn api_version(&self) -> &str {
        self.0.get("apiVersion").and_then(Value::as_str).unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.0.get("kind").and_then(Value::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.metadata()
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
    }

    /// Look up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get("labels"))
            .and_then(|l| l.get(key))
            .and_then(Value::as_str)
    }

    /// `<kind>/<name>`, the string target selectors are matched against.
    pub fn kind_name(&self) -> String {
        format!("{}/{}", self.kind(), self.name())
    }

    /// Set `metadata.namespace` if the resource has none.
    pub fn default_namespace(&mut self, namespace: &str) {
        let metadata = self.metadata_mut();
        if !metadata.contains_key("namespace") {
            metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
        }
    }

    /// Set a label, creating `metadata.labels` when needed.
    pub fn set_label(&mut self, key: &str, value: &str) {
        let metadata = self.metadata_mut();
        let labels = metadata
            .entry("labels")
            .or_insert_with(|| Value::Object(Map::new()));
        if !labels.is_object() {
            *labels = Value::Object(Map::new());
        }
        if let Value::Object(labels) = labels {
            labels.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    /// Render as a single YAML document.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.0.get("metadata").and_then(Value::as_object)
    }

    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        let metadata = self
            .0
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        match metadata {
            Value::Object(map) => map,
            _ => unreachable!("metadata was just replaced by an object"),
        }
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind_name())
    }
}

/// Extract every manifest from evaluator output.
pub fn extract(value: &Value) -> Result<Vec<Manifest>, ManifestError> {
    let mut out = Vec::new();
    walk(value, "", &mut out)?;
    Ok(out)
}

fn walk(value: &Value, path: &str, out: &mut Vec<Manifest>) -> Result<(), ManifestError> {
    match value {
        Value::Object(object) if is_resource(object) => {
            if object.get("kind").and_then(Value::as_str) == Some("List") {
                let items = object
                    .get("items")
                    .and_then(Value::as_array)
                    .ok_or_else(|| ManifestError::InvalidList {
                        path: display_path(path),
                    })?;
                for (i, item) in items.iter().enumerate() {
                    walk(item, &format!("{}.items[{}]", path, i), out)?;
                }
                Ok(())
            } else {
                out.push(Manifest::from_object(object.clone(), &display_path(path))?);
                Ok(())
            }
        }
        Value::Object(object) => {
            for (key, child) in object {
                walk(child, &format!("{}.{}", path, key), out)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, &format!("{}[{}]", path, i), out)?;
            }
            Ok(())
        }
        Value::Null => Ok(()),
        Value::Bool(_) => primitive(path, "boolean"),
        Value::Number(_) => primitive(path, "number"),
        Value::String(_) => primitive(path, "string"),
    }
}

fn primitive(path: &str, found: &'static str) -> Result<(), ManifestError> {
    Err(ManifestError::PrimitiveReached {
        path: display_path(path),
        found,
    })
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        ".".to_string()
    } else {
        path.to_string()
    }
}

/// True when the object carries string `apiVersion` and `kind` fields.
pub fn is_resource(object: &Map<String, Value>) -> bool {
    object.get("apiVersion").is_some_and(Value::is_string)
        && object.get("kind").is_some_and(Value::is_string)
}

/// True when the object is an inline environment definition.
pub fn is_environment(object: &Map<String, Value>) -> bool {
    object.get("apiVersion").and_then(Value::as_str) == Some(ENVIRONMENT_API_VERSION)
        && object.get("kind").and_then(Value::as_str) == Some("Environment")
}

/// Value of the environment label for an environment.
pub fn environment_label(name: &str, namespace: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}", name, namespace).as_bytes());
    let mut value = hex::encode(digest);
    value.truncate(48);
    value
}

/// Apply namespace defaulting, labelling, filtering and ordering.
pub fn process(
    manifests: Vec<Manifest>,
    namespace: &str,
    label: Option<&str>,
    filters: &TargetFilter,
) -> Vec<Manifest> {
    let mut out: Vec<Manifest> = manifests
        .into_iter()
        .filter(|m| filters.matches(m.kind(), m.name()))
        .map(|mut m| {
            m.default_namespace(namespace);
            if let Some(value) = label {
                m.set_label(ENVIRONMENT_LABEL, value);
            }
            m
        })
        .collect();
    sort(&mut out);
    out
}

/// Order manifests so that dependencies are created first.
pub fn sort(manifests: &mut [Manifest]) {
    manifests.sort_by(|a, b| compare(a, b));
}

fn compare(a: &Manifest, b: &Manifest) -> Ordering {
    kind_rank(a.kind())
        .cmp(&kind_rank(b.kind()))
        .then_with(|| a.kind().cmp(b.kind()))
        .then_with(|| a.namespace().cmp(&b.namespace()))
        .then_with(|| a.name().cmp(b.name()))
}

fn kind_rank(kind: &str) -> usize {
    KIND_ORDER
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(KIND_ORDER.len())
}

/// Render manifests as a multi-document YAML stream.
pub fn to_yaml_stream(manifests: &[Manifest]) -> Result<String, serde_yaml::Error> {
    let docs = manifests
        .iter()
        .map(Manifest::to_yaml)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(docs.join("---\n"))
}

//! core::filter
//!
//! Target selectors that scope which resources an operation affects.
//!
//! # Semantics
//!
//! Each raw selector is compiled into a case-insensitive regular expression
//! anchored at both ends and matched against `"<kind>/<name>"`. A resource is
//! selected when it matches at least one expression. An empty filter selects
//! everything.
//!
//! # Example
//!
//! ```
//! use tankflow::core::filter::TargetFilter;
//!
//! let filter = TargetFilter::compile(["deployment/grafana", "service/.*"]).unwrap();
//! assert!(filter.matches("Deployment", "grafana"));
//! assert!(filter.matches("Service", "prometheus"));
//! assert!(!filter.matches("ConfigMap", "grafana"));
//!
//! assert!(TargetFilter::compile(["[invalid"]).is_err());
//! ```

use std::fmt;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Errors from compiling target selectors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A selector could not be compiled into a match expression.
    #[error("invalid target selector '{raw}': {message}")]
    InvalidFilterSyntax {
        /// The selector as given on the command line
        raw: String,
        /// Compiler diagnostic
        message: String,
    },
}

/// A single compiled selector.
#[derive(Debug, Clone)]
pub struct TargetExpr {
    raw: String,
    regex: Regex,
}

impl TargetExpr {
    /// Compile one raw selector.
    pub fn new(raw: &str) -> Result<Self, FilterError> {
        let regex = RegexBuilder::new(&format!("^(?:{})$", raw))
            .case_insensitive(true)
            .build()
            .map_err(|e| FilterError::InvalidFilterSyntax {
                raw: raw.to_string(),
                message: regex_diagnostic(&e.to_string()),
            })?;

        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    /// The selector exactly as it was given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether `<kind>/<name>` matches this selector.
    pub fn is_match(&self, kind: &str, name: &str) -> bool {
        self.regex.is_match(&format!("{}/{}", kind, name))
    }
}

impl fmt::Display for TargetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// An ordered set of compiled selectors, evaluated as a union.
#[derive(Debug, Clone, Default)]
pub struct TargetFilter {
    exprs: Vec<TargetExpr>,
}

impl TargetFilter {
    /// A filter that selects every resource.
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile raw selectors into a filter.
    ///
    /// Compilation is all-or-nothing: the first malformed selector aborts
    /// and no partial filter is returned.
    pub fn compile<I, S>(raw: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exprs = raw
            .into_iter()
            .map(|s| TargetExpr::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { exprs })
    }

    /// True when no selectors were given.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Number of selectors.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// The raw selectors in their original order.
    pub fn sources(&self) -> Vec<&str> {
        self.exprs.iter().map(TargetExpr::as_str).collect()
    }

    /// Check whether a resource is selected.
    pub fn matches(&self, kind: &str, name: &str) -> bool {
        self.exprs.is_empty() || self.exprs.iter().any(|e| e.is_match(kind, name))
    }
}

fn regex_diagnostic(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .rev()
        .find(|l| !l.is_empty())
        .unwrap_or(s)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_selects_everything() {
        let filter = TargetFilter::compile(Vec::<String>::new()).unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches("Deployment", "anything"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let filter = TargetFilter::compile(["deployment/Grafana"]).unwrap();
        assert!(filter.matches("Deployment", "grafana"));
        assert!(filter.matches("DEPLOYMENT", "GRAFANA"));
    }

    #[test]
    fn matching_is_anchored() {
        let filter = TargetFilter::compile(["deployment/graf"]).unwrap();
        assert!(!filter.matches("Deployment", "grafana"));
        assert!(!filter.matches("XDeployment", "graf"));
    }

    #[test]
    fn alternation_does_not_escape_anchors() {
        let filter = TargetFilter::compile(["service/a|deployment/b"]).unwrap();
        assert!(filter.matches("Service", "a"));
        assert!(filter.matches("Deployment", "b"));
        assert!(!filter.matches("Service", "ab"));
        assert!(!filter.matches("Deployment", "bb"));
    }

    #[test]
    fn union_across_expressions() {
        let filter = TargetFilter::compile(["service/.*", "deployment/grafana"]).unwrap();
        assert!(filter.matches("Service", "loki"));
        assert!(filter.matches("Deployment", "grafana"));
        assert!(!filter.matches("Deployment", "loki"));
    }

    #[test]
    fn malformed_selector_fails_atomically() {
        let err = TargetFilter::compile(["service/.*", "[invalid", "deployment/x"]).unwrap_err();
        match err {
            FilterError::InvalidFilterSyntax { raw, .. } => assert_eq!(raw, "[invalid"),
        }
    }

    #[test]
    fn sources_preserve_order() {
        let filter = TargetFilter::compile(["b/.*", "a/.*", "c/x"]).unwrap();
        assert_eq!(filter.sources(), vec!["b/.*", "a/.*", "c/x"]);
        assert_eq!(filter.len(), 3);
    }
}

//! Issue extraction from a circuit JSON tree.
//!
//! The tree has no fixed schema: elements are objects of open-ended shape,
//! nested through arrays and sub-objects. An element is an *issue* when it
//! carries a non-empty error or warning marker field. Which fields count as
//! markers is owned by the compiler that produced the tree, so the
//! recognition rule is a [`TagSchema`] value rather than hard-coded names.
//!
//! Traversal is pre-order depth-first: array elements in index order, object
//! values in key enumeration order. A tagged element's children are always
//! visited too — nested elements may carry independent issues. The walk
//! carries a depth budget so pathological nesting fails fast instead of
//! overflowing the stack.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default traversal depth budget. Real circuit JSON nests a handful of
/// levels; anything past this is malformed input.
pub const DEFAULT_MAX_DEPTH: usize = 128;

const UNKNOWN_ERROR: &str = "Unknown error";
const UNKNOWN_WARNING: &str = "Unknown warning";
const UNKNOWN_ELEMENT: &str = "unknown";

/// Field names that mark an element as an error or warning.
///
/// The defaults match circuit JSON as emitted by the tscircuit compiler.
/// Message lookup order per kind: the per-kind field (`error_message` /
/// `warning_message`), then the shared `message` field, then a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSchema {
    /// Field whose non-empty string value marks an element as an error.
    pub error_flag: String,
    /// Field whose non-empty string value marks an element as a warning.
    pub warning_flag: String,
    /// Shared message field consulted for both kinds.
    pub message_field: String,
    /// Error-specific message field, consulted before `message_field`.
    pub error_message_field: Option<String>,
    /// Warning-specific message field, consulted before `message_field`.
    pub warning_message_field: Option<String>,
    /// Field naming the element's own type (for display, not recognition).
    pub element_type_field: String,
}

impl Default for TagSchema {
    fn default() -> Self {
        Self {
            error_flag: "error_type".into(),
            warning_flag: "warning_type".into(),
            message_field: "message".into(),
            error_message_field: Some("error_message".into()),
            warning_message_field: Some("warning_message".into()),
            element_type_field: "type".into(),
        }
    }
}

/// Whether an issue came from an error marker or a warning marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Error,
    Warning,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One tagged element, located by its traversal path from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dot/bracket path from the root, e.g. `root.components[2].trace`.
    pub path: String,
    pub kind: IssueKind,
    /// The marker field's value, e.g. `pcb_trace_error`.
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    /// The element's own type field, `"unknown"` when absent.
    pub element_type: String,
}

/// Result of one traversal: every issue found, a rendered summary, and a
/// convenience flag. A derived snapshot — computing it never mutates the
/// input tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CircuitAnalysis {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    /// `"<type>: <message>"` per issue, errors first, one per line.
    pub summary: String,
    pub has_issues: bool,
}

/// Traversal failure. Well-formed input cannot fail; the only condition is
/// the depth guard tripping on pathologically nested input.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("circuit json exceeds max depth {limit} at {path}")]
    DepthLimitExceeded { path: String, limit: usize },
}

/// Issue extractor configured with a recognition rule and a depth budget.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    schema: TagSchema,
    max_depth: Option<usize>,
}

impl Analyzer {
    pub fn new(schema: TagSchema) -> Self {
        Self {
            schema,
            max_depth: None,
        }
    }

    /// Override the depth budget (default [`DEFAULT_MAX_DEPTH`]).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Walk `root` and collect every tagged element.
    ///
    /// Scalars and `null` are leaves and contribute nothing; an element
    /// carrying both markers contributes one entry to each list.
    pub fn analyze(&self, root: &serde_json::Value) -> Result<CircuitAnalysis, AnalysisError> {
        let limit = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.visit(root, "root", 0, limit, &mut errors, &mut warnings)?;

        let summary = errors
            .iter()
            .chain(warnings.iter())
            .map(|issue| format!("{}: {}", issue.issue_type, issue.message))
            .collect::<Vec<_>>()
            .join("\n");
        let has_issues = !errors.is_empty() || !warnings.is_empty();

        if has_issues {
            tracing::debug!(
                errors = errors.len(),
                warnings = warnings.len(),
                "circuit json carries issues"
            );
        }

        Ok(CircuitAnalysis {
            errors,
            warnings,
            summary,
            has_issues,
        })
    }

    fn visit(
        &self,
        value: &serde_json::Value,
        path: &str,
        depth: usize,
        limit: usize,
        errors: &mut Vec<Issue>,
        warnings: &mut Vec<Issue>,
    ) -> Result<(), AnalysisError> {
        if depth > limit {
            return Err(AnalysisError::DepthLimitExceeded {
                path: path.to_string(),
                limit,
            });
        }

        match value {
            serde_json::Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.visit(item, &format!("{path}[{index}]"), depth + 1, limit, errors, warnings)?;
                }
            }
            serde_json::Value::Object(map) => {
                if let Some(issue_type) = non_empty_str(map.get(&self.schema.error_flag)) {
                    errors.push(self.issue_at(map, path, IssueKind::Error, issue_type));
                }
                if let Some(issue_type) = non_empty_str(map.get(&self.schema.warning_flag)) {
                    warnings.push(self.issue_at(map, path, IssueKind::Warning, issue_type));
                }

                // Children of tagged elements are visited too: nested
                // elements may carry issues of their own.
                for (key, child) in map {
                    if child.is_object() || child.is_array() {
                        self.visit(child, &format!("{path}.{key}"), depth + 1, limit, errors, warnings)?;
                    }
                }
            }
            // Scalars and null are leaves.
            _ => {}
        }

        Ok(())
    }

    fn issue_at(
        &self,
        element: &serde_json::Map<String, serde_json::Value>,
        path: &str,
        kind: IssueKind,
        issue_type: &str,
    ) -> Issue {
        let (kind_message_field, placeholder) = match kind {
            IssueKind::Error => (self.schema.error_message_field.as_deref(), UNKNOWN_ERROR),
            IssueKind::Warning => (self.schema.warning_message_field.as_deref(), UNKNOWN_WARNING),
        };

        let message = kind_message_field
            .and_then(|field| non_empty_str(element.get(field)))
            .or_else(|| non_empty_str(element.get(&self.schema.message_field)))
            .unwrap_or(placeholder)
            .to_string();

        let element_type = non_empty_str(element.get(&self.schema.element_type_field))
            .unwrap_or(UNKNOWN_ELEMENT)
            .to_string();

        Issue {
            path: path.to_string(),
            kind,
            issue_type: issue_type.to_string(),
            message,
            element_type,
        }
    }
}

fn non_empty_str(value: Option<&serde_json::Value>) -> Option<&str> {
    value.and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

/// Analyze with the default circuit-json schema and depth budget.
pub fn analyze(root: &serde_json::Value) -> Result<CircuitAnalysis, AnalysisError> {
    Analyzer::default().analyze(root)
}
